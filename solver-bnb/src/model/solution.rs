//! MILP solution types.

use super::VarId;
use crate::search::TreeStats;

/// Status of the MILP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipStatus {
    /// Optimal solution found.
    Optimal,

    /// Problem is infeasible (root relaxation or every integral point).
    Infeasible,

    /// Root relaxation is unbounded.
    Unbounded,

    /// Node limit reached, best solution returned.
    NodeLimit,

    /// Time limit reached, best solution returned.
    TimeLimit,
}

impl MipStatus {
    /// Returns true if the search stopped on a node or time budget.
    pub fn is_limit(&self) -> bool {
        matches!(self, MipStatus::NodeLimit | MipStatus::TimeLimit)
    }

    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, MipStatus::Optimal)
    }
}

/// Complete MILP solution with diagnostics.
#[derive(Debug, Clone)]
pub struct MilpSolution {
    /// Solve status.
    pub status: MipStatus,

    /// Incumbent assignment in declaration order (empty if none was found).
    pub x: Vec<f64>,

    /// Objective value of the incumbent.
    pub obj_val: f64,

    /// Best bound still open when the search stopped
    /// (equals `obj_val` once optimality is proven).
    pub bound: f64,

    /// Relative optimality gap: |obj_val - bound| / |obj_val|.
    pub gap: f64,

    /// Search statistics.
    pub stats: TreeStats,

    /// Total solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl Default for MilpSolution {
    fn default() -> Self {
        Self {
            status: MipStatus::Infeasible,
            x: Vec::new(),
            obj_val: f64::NAN,
            bound: f64::NAN,
            gap: f64::INFINITY,
            stats: TreeStats::default(),
            solve_time_ms: 0,
        }
    }
}

impl MilpSolution {
    /// Create a solution indicating infeasibility.
    pub fn infeasible() -> Self {
        Self {
            status: MipStatus::Infeasible,
            ..Default::default()
        }
    }

    /// Create a solution indicating an unbounded relaxation.
    pub fn unbounded() -> Self {
        Self {
            status: MipStatus::Unbounded,
            ..Default::default()
        }
    }

    /// Returns true if an integral assignment was found.
    pub fn has_solution(&self) -> bool {
        !self.x.is_empty()
    }

    /// Value of a variable in the incumbent.
    pub fn var_value(&self, var: VarId) -> Option<f64> {
        self.x.get(var.0).copied()
    }

    /// Compute relative gap.
    pub fn compute_gap(primal: f64, dual: f64) -> f64 {
        if !primal.is_finite() || !dual.is_finite() {
            return f64::INFINITY;
        }
        let denom = primal.abs().max(1e-10);
        (primal - dual).abs() / denom
    }
}

/// Tracks the best known integral solution (incumbent).
///
/// Scores are in maximization space; only a strictly better score replaces
/// the incumbent.
#[derive(Debug, Clone)]
pub struct IncumbentTracker {
    /// Current best solution (if any).
    pub solution: Option<Vec<f64>>,

    /// Objective value of the incumbent, in the problem's own sense.
    pub obj_val: f64,

    /// Score of the incumbent. Initialized to -inf.
    pub score: f64,

    /// Node that produced the incumbent.
    pub node_id: Option<u64>,

    /// Number of times incumbent was updated.
    pub update_count: u64,
}

impl Default for IncumbentTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl IncumbentTracker {
    /// Create a new incumbent tracker.
    pub fn new() -> Self {
        Self {
            solution: None,
            obj_val: f64::NAN,
            score: f64::NEG_INFINITY,
            node_id: None,
            update_count: 0,
        }
    }

    /// Check if we have an incumbent.
    pub fn has_incumbent(&self) -> bool {
        self.solution.is_some()
    }

    /// Whether a score would strictly improve on the incumbent.
    pub fn improves(&self, score: f64) -> bool {
        score > self.score
    }

    /// Try to update incumbent with a new solution.
    ///
    /// Returns true if the incumbent was improved.
    pub fn update(&mut self, x: &[f64], obj: f64, score: f64, node_id: u64) -> bool {
        if self.improves(score) {
            self.solution = Some(x.to_vec());
            self.obj_val = obj;
            self.score = score;
            self.node_id = Some(node_id);
            self.update_count += 1;
            true
        } else {
            false
        }
    }
}
