//! Relaxation oracle backed by the `microlp` simplex solver.

use microlp::{ComparisonOp as LpOp, OptimizationDirection, Problem};

use super::{LpRelaxation, Relaxation, RelaxationOracle, RelaxationOutcome, OracleError};
use crate::model::{ComparisonOp, ObjectiveSense};

/// Oracle solving relaxations with `microlp`.
///
/// Every call builds a fresh `microlp::Problem`, so results depend only on
/// the relaxation passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpOracle;

impl MicroLpOracle {
    /// Create a new oracle.
    pub fn new() -> Self {
        Self
    }
}

impl RelaxationOracle for MicroLpOracle {
    fn solve(&self, lp: &LpRelaxation) -> Result<RelaxationOutcome, OracleError> {
        let direction = match lp.sense {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let mut problem = Problem::new(direction);

        let vars: Vec<_> = lp
            .objective
            .iter()
            .zip(lp.lower.iter().zip(&lp.upper))
            .map(|(&c, (&lb, &ub))| problem.add_var(c, (lb, ub)))
            .collect();

        for (row, (&op, &rhs)) in lp.rows.outer_iterator().zip(lp.ops.iter().zip(&lp.rhs)) {
            let expr: Vec<_> = row.iter().map(|(j, &a)| (vars[j], a)).collect();
            let op = match op {
                ComparisonOp::Le => LpOp::Le,
                ComparisonOp::Ge => LpOp::Ge,
                ComparisonOp::Eq => LpOp::Eq,
            };
            problem.add_constraint(expr, op, rhs);
        }

        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(microlp::Error::Infeasible) => return Ok(RelaxationOutcome::Infeasible),
            Err(microlp::Error::Unbounded) => return Ok(RelaxationOutcome::Unbounded),
            Err(microlp::Error::InternalError(msg)) => {
                return Err(OracleError::SolverFailure(msg));
            }
        };

        let values: Vec<f64> = vars.iter().map(|&v| solution[v]).collect();
        let objective = solution.objective() + lp.objective_constant;

        if !objective.is_finite() || values.iter().any(|v| !v.is_finite()) {
            return Err(OracleError::NumericalFailure(format!(
                "non-finite relaxation solution (objective {})",
                objective
            )));
        }

        Ok(RelaxationOutcome::Optimal(Relaxation { objective, values }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MilpProblem, VarId};

    fn solve(prob: &MilpProblem) -> Result<RelaxationOutcome, OracleError> {
        MicroLpOracle::new().solve(&LpRelaxation::assemble(prob, std::iter::empty()))
    }

    #[test]
    fn test_simple_lp() {
        // max x0 + x1
        // s.t. x0 <= 2.5, x1 <= 1.5, x >= 0
        let mut prob = MilpProblem::new(ObjectiveSense::Maximize);
        let x0 = prob.add_integer_var("x0", (0.0, f64::INFINITY));
        let x1 = prob.add_integer_var("x1", (0.0, f64::INFINITY));
        prob.add_constraint([(x0, 1.0)], ComparisonOp::Le, 2.5);
        prob.add_constraint([(x1, 1.0)], ComparisonOp::Le, 1.5);
        prob.set_objective([(x0, 1.0), (x1, 1.0)]);

        match solve(&prob).unwrap() {
            RelaxationOutcome::Optimal(r) => {
                assert!((r.objective - 4.0).abs() < 1e-8);
                assert!((r.values[0] - 2.5).abs() < 1e-8);
                assert!((r.values[1] - 1.5).abs() < 1e-8);
            }
            other => panic!("expected optimal relaxation, got {:?}", other),
        }
    }

    #[test]
    fn test_minimize_with_constant() {
        // min x + 10 s.t. x >= 1.5
        let mut prob = MilpProblem::new(ObjectiveSense::Minimize);
        let x = prob.add_integer_var("x", (0.0, 10.0));
        prob.add_constraint([(x, 1.0)], ComparisonOp::Ge, 1.5);
        prob.set_objective(crate::model::LinearExpr::var(x).with_constant(10.0));

        match solve(&prob).unwrap() {
            RelaxationOutcome::Optimal(r) => {
                assert!((r.objective - 11.5).abs() < 1e-8);
                assert!((r.values[0] - 1.5).abs() < 1e-8);
            }
            other => panic!("expected optimal relaxation, got {:?}", other),
        }
    }

    #[test]
    fn test_infeasible_lp() {
        // x >= 5, x <= 2
        let mut prob = MilpProblem::new(ObjectiveSense::Maximize);
        let x = prob.add_integer_var("x", (f64::NEG_INFINITY, f64::INFINITY));
        prob.add_constraint([(x, 1.0)], ComparisonOp::Ge, 5.0);
        prob.add_constraint([(x, 1.0)], ComparisonOp::Le, 2.0);
        prob.set_objective_var(x);

        assert_eq!(solve(&prob), Ok(RelaxationOutcome::Infeasible));
    }

    #[test]
    fn test_unbounded_lp() {
        let mut prob = MilpProblem::new(ObjectiveSense::Maximize);
        let x = prob.add_integer_var("x", (0.0, f64::INFINITY));
        prob.set_objective_var(x);

        assert_eq!(solve(&prob), Ok(RelaxationOutcome::Unbounded));
    }

    #[test]
    fn test_equality_row() {
        // max y s.t. y - 2x == 0, x <= 1.25
        let mut prob = MilpProblem::new(ObjectiveSense::Maximize);
        let x = prob.add_integer_var("x", (0.0, 1.25));
        let y = prob.add_continuous_var("y", (f64::NEG_INFINITY, f64::INFINITY));
        prob.add_constraint([(y, 1.0), (x, -2.0)], ComparisonOp::Eq, 0.0);
        prob.set_objective_var(y);

        match solve(&prob).unwrap() {
            RelaxationOutcome::Optimal(r) => {
                assert!((r.objective - 2.5).abs() < 1e-8);
                assert!((r.values[VarId(0).idx()] - 1.25).abs() < 1e-8);
            }
            other => panic!("expected optimal relaxation, got {:?}", other),
        }
    }
}
