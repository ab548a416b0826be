//! Search events emitted by the B&B driver.

use std::fmt;

use crate::model::VarId;

/// A state transition of the search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// A solved node entered the frontier.
    Pushed {
        /// Node ID.
        node: u64,
        /// Parent node ID.
        parent: Option<u64>,
        /// Relaxation objective.
        bound: f64,
    },

    /// A node left the frontier for processing.
    Popped {
        /// Node ID.
        node: u64,
        /// Relaxation objective.
        bound: f64,
    },

    /// A node was split on a fractional variable.
    Branched {
        /// Node ID.
        node: u64,
        /// Branching variable.
        var: VarId,
        /// Its relaxed value.
        value: f64,
    },

    /// A child relaxation was infeasible.
    PrunedInfeasible {
        /// Node ID.
        node: u64,
    },

    /// The oracle failed on a child relaxation.
    PrunedSolverFailure {
        /// Node ID.
        node: u64,
        /// Failure description.
        reason: String,
    },

    /// A node could not improve on the incumbent.
    PrunedByBound {
        /// Node ID.
        node: u64,
        /// Relaxation objective.
        bound: f64,
        /// Incumbent objective at the time of pruning.
        incumbent: f64,
    },

    /// A popped node had an integral relaxation.
    IntegralCandidate {
        /// Node ID.
        node: u64,
        /// Its objective.
        objective: f64,
    },

    /// The incumbent improved.
    IncumbentUpdated {
        /// Node ID.
        node: u64,
        /// New incumbent objective.
        objective: f64,
    },
}

impl SearchEvent {
    /// Node the event refers to.
    pub fn node(&self) -> u64 {
        match self {
            SearchEvent::Pushed { node, .. }
            | SearchEvent::Popped { node, .. }
            | SearchEvent::Branched { node, .. }
            | SearchEvent::PrunedInfeasible { node }
            | SearchEvent::PrunedSolverFailure { node, .. }
            | SearchEvent::PrunedByBound { node, .. }
            | SearchEvent::IntegralCandidate { node, .. }
            | SearchEvent::IncumbentUpdated { node, .. } => *node,
        }
    }

    /// Log the event at its level.
    pub(crate) fn log(&self) {
        match self {
            SearchEvent::Pushed { .. } | SearchEvent::Popped { .. } => log::trace!("{}", self),
            SearchEvent::PrunedSolverFailure { .. } => log::warn!("{}", self),
            _ => log::debug!("{}", self),
        }
    }
}

impl fmt::Display for SearchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchEvent::Pushed { node, parent, bound } => match parent {
                Some(p) => write!(f, "push node {} (parent {}) bound={:.6e}", node, p, bound),
                None => write!(f, "push root node {} bound={:.6e}", node, bound),
            },
            SearchEvent::Popped { node, bound } => {
                write!(f, "pop node {} bound={:.6e}", node, bound)
            }
            SearchEvent::Branched { node, var, value } => {
                write!(f, "branch node {} on {}={:.6}", node, var, value)
            }
            SearchEvent::PrunedInfeasible { node } => {
                write!(f, "prune node {}: infeasible", node)
            }
            SearchEvent::PrunedSolverFailure { node, reason } => {
                write!(f, "prune node {}: oracle failed ({})", node, reason)
            }
            SearchEvent::PrunedByBound {
                node,
                bound,
                incumbent,
            } => write!(
                f,
                "prune node {}: bound {:.6e} cannot improve incumbent {:.6e}",
                node, bound, incumbent
            ),
            SearchEvent::IntegralCandidate { node, objective } => {
                write!(f, "node {} integral, obj={:.6e}", node, objective)
            }
            SearchEvent::IncumbentUpdated { node, objective } => {
                write!(f, "new incumbent from node {}: obj={:.6e}", node, objective)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        let e = SearchEvent::Branched {
            node: 4,
            var: VarId(1),
            value: 1.5,
        };
        assert_eq!(e.to_string(), "branch node 4 on x1=1.500000");
        assert_eq!(e.node(), 4);

        let e = SearchEvent::PrunedInfeasible { node: 9 };
        assert_eq!(e.to_string(), "prune node 9: infeasible");
    }
}
