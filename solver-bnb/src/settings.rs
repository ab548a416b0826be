//! Configuration settings for the branch-and-bound solver.

use crate::error::{MipError, MipResult};

/// Branching variable selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchingRule {
    /// First fractional integer variable in declaration order.
    #[default]
    FirstFractional,

    /// Select variable with fractional part closest to 0.5.
    MostFractional,
}

/// Node selection strategy for the B&B tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelection {
    /// Always select the node with the best relaxation bound.
    #[default]
    BestBound,

    /// Depth-first search (helps find feasible solutions quickly).
    DepthFirst,

    /// Arrival order, ignoring the bound.
    Fifo,
}

/// Branch-and-bound solver settings.
#[derive(Debug, Clone)]
pub struct MipSettings {
    // === Termination criteria ===
    /// Maximum number of nodes to explore (None = unlimited).
    pub max_nodes: Option<u64>,

    /// Time limit in milliseconds (None = unlimited).
    pub time_limit_ms: Option<u64>,

    /// Keep exploring the frontier after its bounds stop beating the incumbent.
    ///
    /// The final objective is the same either way; exhaustive search only
    /// visits more nodes.
    pub exhaustive: bool,

    // === Integrality ===
    /// Integer feasibility tolerance used by `SearchNode::is_integral`.
    /// A variable is considered integer if |x - round(x)| <= int_feas_tol.
    pub int_feas_tol: f64,

    /// Decimal digits a relaxed value is rounded to before the
    /// fractionality test that picks the branching variable.
    pub round_digits: u32,

    // === Search strategy ===
    /// Branching variable selection rule.
    pub branching_rule: BranchingRule,

    /// Node selection strategy.
    pub node_selection: NodeSelection,

    // === Output ===
    /// Record every search event in a trace readable after the solve.
    pub record_trace: bool,

    /// Print progress information.
    pub verbose: bool,

    /// Log frequency (print every N nodes).
    pub log_freq: u64,
}

impl Default for MipSettings {
    fn default() -> Self {
        Self {
            // Termination
            max_nodes: None,
            time_limit_ms: None,
            exhaustive: false,

            // Integrality
            int_feas_tol: 1e-4,
            round_digits: 5,

            // Search
            branching_rule: BranchingRule::default(),
            node_selection: NodeSelection::default(),

            // Output
            record_trace: false,
            verbose: false,
            log_freq: 100,
        }
    }
}

impl MipSettings {
    /// Create settings with verbose output enabled.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            log_freq: 1,
            ..Self::default()
        }
    }

    /// Set time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set maximum nodes.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    /// Set the branching rule.
    pub fn with_branching_rule(mut self, rule: BranchingRule) -> Self {
        self.branching_rule = rule;
        self
    }

    /// Set the node selection strategy.
    pub fn with_node_selection(mut self, selection: NodeSelection) -> Self {
        self.node_selection = selection;
        self
    }

    /// Explore the whole frontier instead of stopping on dominated bounds.
    pub fn exhaustive(mut self) -> Self {
        self.exhaustive = true;
        self
    }

    /// Record the search trace.
    pub fn with_trace(mut self) -> Self {
        self.record_trace = true;
        self
    }

    /// Check that the settings describe a usable configuration.
    pub fn validate(&self) -> MipResult<()> {
        if !self.int_feas_tol.is_finite() || self.int_feas_tol < 0.0 {
            return Err(MipError::InvalidSettings(format!(
                "int_feas_tol must be finite and non-negative, got {}",
                self.int_feas_tol
            )));
        }
        if self.round_digits > 15 {
            return Err(MipError::InvalidSettings(format!(
                "round_digits must be at most 15, got {}",
                self.round_digits
            )));
        }
        if self.log_freq == 0 {
            return Err(MipError::InvalidSettings("log_freq must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = MipSettings::default();
        assert_eq!(s.int_feas_tol, 1e-4);
        assert_eq!(s.round_digits, 5);
        assert_eq!(s.branching_rule, BranchingRule::FirstFractional);
        assert_eq!(s.node_selection, NodeSelection::BestBound);
        assert!(s.max_nodes.is_none());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let s = MipSettings::default()
            .with_max_nodes(10)
            .with_time_limit(1.5)
            .with_node_selection(NodeSelection::Fifo)
            .exhaustive();
        assert_eq!(s.max_nodes, Some(10));
        assert_eq!(s.time_limit_ms, Some(1500));
        assert_eq!(s.node_selection, NodeSelection::Fifo);
        assert!(s.exhaustive);
    }

    #[test]
    fn test_invalid_settings() {
        let s = MipSettings {
            int_feas_tol: -1.0,
            ..Default::default()
        };
        assert!(matches!(s.validate(), Err(MipError::InvalidSettings(_))));

        let s = MipSettings {
            round_digits: 20,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }
}
