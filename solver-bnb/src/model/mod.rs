//! Problem and solution types for the MILP solver.

mod problem;
mod solution;

pub use problem::{
    ComparisonOp, Constraint, LinearExpr, MilpProblem, ObjectiveSense, VarId, VarKind, Variable,
};
pub use solution::{IncumbentTracker, MilpSolution, MipStatus};
