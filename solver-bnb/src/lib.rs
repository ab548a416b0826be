//! Best-first branch-and-bound for mixed-integer linear programs.
//!
//! A [`MilpProblem`] is searched by repeatedly solving continuous
//! relaxations through a [`RelaxationOracle`], splitting on fractional
//! integer variables and pruning subproblems that are infeasible or cannot
//! beat the incumbent.
//!
//! ```
//! use solver_bnb::{
//!     solve_milp, ComparisonOp, MilpProblem, MipSettings, MipStatus, ObjectiveSense,
//! };
//!
//! let mut prob = MilpProblem::new(ObjectiveSense::Maximize);
//! let x = prob.add_integer_var("x", (0.0, f64::INFINITY));
//! prob.add_constraint([(x, 1.0)], ComparisonOp::Le, 3.7);
//! prob.set_objective_var(x);
//!
//! let sol = solve_milp(&prob, &MipSettings::default()).unwrap();
//! assert_eq!(sol.status, MipStatus::Optimal);
//! assert!((sol.obj_val - 3.0).abs() < 1e-6);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod model;
pub mod oracle;
pub mod search;
pub mod settings;

use std::sync::Arc;

pub use error::{MipError, MipResult};
pub use model::{
    ComparisonOp, Constraint, LinearExpr, MilpProblem, MilpSolution, MipStatus, ObjectiveSense,
    VarId, VarKind, Variable,
};
pub use oracle::{
    LpRelaxation, MicroLpOracle, OracleError, Relaxation, RelaxationOracle, RelaxationOutcome,
};
pub use search::{BranchAndBound, SearchEvent, TreeStats};
pub use settings::{BranchingRule, MipSettings, NodeSelection};

/// Solve a MILP with the default `microlp` relaxation oracle.
pub fn solve_milp(prob: &MilpProblem, settings: &MipSettings) -> MipResult<MilpSolution> {
    solve_milp_with(prob, settings, &MicroLpOracle::new())
}

/// Solve a MILP with a caller-supplied relaxation oracle.
pub fn solve_milp_with<O: RelaxationOracle + ?Sized>(
    prob: &MilpProblem,
    settings: &MipSettings,
    oracle: &O,
) -> MipResult<MilpSolution> {
    let mut tree = BranchAndBound::new(Arc::new(prob.clone()), settings.clone())?;
    tree.solve(oracle)
}
