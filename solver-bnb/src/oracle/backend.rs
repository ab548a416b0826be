//! Relaxation oracle trait and the problem handle it consumes.

use sprs::{CompressedStorage, CsMat, TriMat};
use thiserror::Error;

use crate::model::{ComparisonOp, Constraint, MilpProblem, ObjectiveSense};

/// Continuous relaxation of a node, materialized for an oracle.
///
/// The problem is:
/// ```text
/// opt  c^T x + c0
/// s.t. A_i x (op_i) rhs_i   for every row i
///      lower <= x <= upper
/// ```
/// Integrality is dropped.
#[derive(Debug, Clone)]
pub struct LpRelaxation {
    /// Optimization direction.
    pub sense: ObjectiveSense,

    /// Dense objective coefficients.
    pub objective: Vec<f64>,

    /// Objective constant.
    pub objective_constant: f64,

    /// Variable lower bounds.
    pub lower: Vec<f64>,

    /// Variable upper bounds.
    pub upper: Vec<f64>,

    /// Constraint rows (CSR, duplicates summed).
    pub rows: CsMat<f64>,

    /// Relation of each row.
    pub ops: Vec<ComparisonOp>,

    /// Right-hand side of each row.
    pub rhs: Vec<f64>,
}

impl LpRelaxation {
    /// Assemble the relaxation of `prob` with additional constraints appended
    /// after the base rows.
    pub fn assemble<'a>(
        prob: &'a MilpProblem,
        extra: impl IntoIterator<Item = &'a Constraint>,
    ) -> Self {
        let n = prob.num_vars();
        let (objective, objective_constant) = match &prob.objective {
            Some(expr) => (expr.dense_coefs(n), expr.constant),
            None => (vec![0.0; n], 0.0),
        };

        let mut triplets: Vec<(usize, usize, f64)> = Vec::new();
        let mut ops = Vec::new();
        let mut rhs = Vec::new();

        for (row, c) in prob.constraints.iter().chain(extra).enumerate() {
            for &(var, coef) in &c.expr.terms {
                triplets.push((row, var.0, coef));
            }
            ops.push(c.op);
            rhs.push(c.effective_rhs());
        }

        Self {
            sense: prob.sense,
            objective,
            objective_constant,
            lower: prob.variables.iter().map(|v| v.lower).collect(),
            upper: prob.variables.iter().map(|v| v.upper).collect(),
            rows: triplets_to_csr(rhs.len(), n, &triplets),
            ops,
            rhs,
        }
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Number of constraint rows.
    pub fn num_rows(&self) -> usize {
        self.rhs.len()
    }
}

/// An optimal solution of a relaxation.
#[derive(Debug, Clone, PartialEq)]
pub struct Relaxation {
    /// Objective value (including the constant).
    pub objective: f64,

    /// Variable values in declaration order.
    pub values: Vec<f64>,
}

/// Outcome of a relaxation solve.
#[derive(Debug, Clone, PartialEq)]
pub enum RelaxationOutcome {
    /// Optimal continuous solution.
    Optimal(Relaxation),

    /// Constraints cannot be satisfied.
    Infeasible,

    /// Objective is unbounded.
    Unbounded,
}

/// Oracle failures, distinct from infeasibility.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// The underlying solver reported an internal error.
    #[error("solver failure: {0}")]
    SolverFailure(String),

    /// The solver returned without a usable assignment.
    #[error("numerical failure: {0}")]
    NumericalFailure(String),
}

/// Solver for continuous relaxations.
///
/// Must be deterministic for a fixed relaxation, otherwise the search order
/// is not reproducible.
pub trait RelaxationOracle {
    /// Solve a relaxation.
    fn solve(&self, lp: &LpRelaxation) -> Result<RelaxationOutcome, OracleError>;
}

impl<F> RelaxationOracle for F
where
    F: Fn(&LpRelaxation) -> Result<RelaxationOutcome, OracleError>,
{
    fn solve(&self, lp: &LpRelaxation) -> Result<RelaxationOutcome, OracleError> {
        self(lp)
    }
}

/// Convert triplets to CSR sparse matrix.
fn triplets_to_csr(nrows: usize, ncols: usize, triplets: &[(usize, usize, f64)]) -> CsMat<f64> {
    if nrows == 0 {
        return CsMat::empty(CompressedStorage::CSR, ncols);
    }

    let mut tri = TriMat::new((nrows, ncols));
    for &(row, col, val) in triplets {
        tri.add_triplet(row, col, val);
    }
    tri.to_csr()
}
