//! Search node representation.

use std::fmt;
use std::sync::Arc;

use crate::model::{ComparisonOp, Constraint, LinearExpr, MilpProblem, VarId};
use crate::oracle::{LpRelaxation, Relaxation};

/// Side of a branching bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// var <= bound
    Upper,

    /// var >= bound
    Lower,
}

/// A bound added by branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundChange {
    /// Variable being bounded.
    pub var: VarId,

    /// Which side is bounded.
    pub kind: BoundKind,

    /// New bound value.
    pub bound: f64,
}

impl BoundChange {
    /// Create a "floor" branch: x <= floor(value).
    pub fn floor_branch(var: VarId, value: f64) -> Self {
        Self {
            var,
            kind: BoundKind::Upper,
            bound: value.floor(),
        }
    }

    /// Create a "ceiling" branch: x >= ceil(value).
    pub fn ceil_branch(var: VarId, value: f64) -> Self {
        Self {
            var,
            kind: BoundKind::Lower,
            bound: value.ceil(),
        }
    }

    /// The bound as a linear constraint.
    pub fn to_constraint(&self) -> Constraint {
        let op = match self.kind {
            BoundKind::Upper => ComparisonOp::Le,
            BoundKind::Lower => ComparisonOp::Ge,
        };
        Constraint::new(LinearExpr::var(self.var), op, self.bound)
    }
}

impl fmt::Display for BoundChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.kind {
            BoundKind::Upper => "<=",
            BoundKind::Lower => ">=",
        };
        write!(f, "{} {} {}", self.var, op, self.bound)
    }
}

/// A node in the B&B search tree.
///
/// The base problem is shared read-only between nodes. Bounds added by
/// branching are owned: a child copies its parent's list and appends one
/// bound, so siblings never observe each other's constraints.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Unique node identifier.
    pub id: u64,

    /// Parent node ID (None for root).
    pub parent_id: Option<u64>,

    /// Depth in the tree (0 for root).
    pub depth: usize,

    /// Problem being searched.
    pub problem: Arc<MilpProblem>,

    /// Bounds added on the path from the root, oldest first.
    pub bound_changes: Vec<BoundChange>,

    /// Solved relaxation, once available.
    pub relaxation: Option<Relaxation>,
}

impl SearchNode {
    /// Create the root node.
    pub fn root(problem: Arc<MilpProblem>) -> Self {
        Self {
            id: 0,
            parent_id: None,
            depth: 0,
            problem,
            bound_changes: Vec::new(),
            relaxation: None,
        }
    }

    /// Create a child node with one additional bound.
    pub fn child(&self, id: u64, bound_change: BoundChange) -> Self {
        let mut bound_changes = Vec::with_capacity(self.bound_changes.len() + 1);
        bound_changes.extend_from_slice(&self.bound_changes);
        bound_changes.push(bound_change);

        Self {
            id,
            parent_id: Some(self.id),
            depth: self.depth + 1,
            problem: Arc::clone(&self.problem),
            bound_changes,
            relaxation: None,
        }
    }

    /// Child with `var <= floor(value)`, using the value from this node's
    /// relaxation. None if this node has no value for `var`.
    pub fn branch_floor(&self, id: u64, var: VarId) -> Option<Self> {
        let value = self.value(var)?;
        Some(self.child(id, BoundChange::floor_branch(var, value)))
    }

    /// Child with `var >= ceil(value)`, using the value from this node's
    /// relaxation. None if this node has no value for `var`.
    pub fn branch_ceil(&self, id: u64, var: VarId) -> Option<Self> {
        let value = self.value(var)?;
        Some(self.child(id, BoundChange::ceil_branch(var, value)))
    }

    /// Materialize the node's constraints and objective for an oracle.
    pub fn build(&self) -> LpRelaxation {
        let bounds: Vec<Constraint> = self.bound_changes.iter().map(|b| b.to_constraint()).collect();
        LpRelaxation::assemble(&self.problem, &bounds)
    }

    /// Attach a solved relaxation.
    pub fn with_relaxation(mut self, relaxation: Relaxation) -> Self {
        self.relaxation = Some(relaxation);
        self
    }

    /// Relaxed value of a variable.
    pub fn value(&self, var: VarId) -> Option<f64> {
        self.relaxation.as_ref()?.values.get(var.0).copied()
    }

    /// Relaxation objective value.
    pub fn bound(&self) -> Option<f64> {
        self.relaxation.as_ref().map(|r| r.objective)
    }

    /// Relaxation objective in maximization space (-inf if unsolved).
    pub fn score(&self) -> f64 {
        self.bound()
            .map_or(f64::NEG_INFINITY, |b| self.problem.sense.score(b))
    }

    /// Check whether every integer variable is within `tol` of an integer.
    ///
    /// A node without a relaxation is never integral.
    pub fn is_integral(&self, tol: f64) -> bool {
        let Some(relaxation) = &self.relaxation else {
            return false;
        };
        self.problem.integer_vars().all(|var| {
            relaxation
                .values
                .get(var.0)
                .is_some_and(|v| (v - v.round()).abs() <= tol)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectiveSense;

    fn two_var_problem() -> Arc<MilpProblem> {
        let mut prob = MilpProblem::new(ObjectiveSense::Maximize);
        let x = prob.add_integer_var("x", (0.0, f64::INFINITY));
        let y = prob.add_integer_var("y", (0.0, f64::INFINITY));
        let obj = prob.add_continuous_var("obj", (f64::NEG_INFINITY, f64::INFINITY));
        prob.add_constraint([(x, 1.0)], ComparisonOp::Le, 2.5);
        prob.add_constraint([(y, 1.0)], ComparisonOp::Le, 1.5);
        prob.add_constraint([(obj, 1.0), (x, -1.0), (y, -1.0)], ComparisonOp::Eq, 0.0);
        prob.set_objective_var(obj);
        Arc::new(prob)
    }

    fn solved(node: SearchNode, values: Vec<f64>) -> SearchNode {
        let objective = values[2];
        node.with_relaxation(Relaxation { objective, values })
    }

    #[test]
    fn test_root_node() {
        let root = SearchNode::root(two_var_problem());
        assert_eq!(root.id, 0);
        assert!(root.parent_id.is_none());
        assert_eq!(root.depth, 0);
        assert!(root.bound_changes.is_empty());
        assert!(root.bound().is_none());
        assert_eq!(root.score(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_bound_changes() {
        // Floor branch on x with value 2.7: x <= 2
        let down = BoundChange::floor_branch(VarId(0), 2.7);
        assert_eq!(down.kind, BoundKind::Upper);
        assert_eq!(down.bound, 2.0);
        assert_eq!(down.to_string(), "x0 <= 2");

        // Ceiling branch on x with value 2.7: x >= 3
        let up = BoundChange::ceil_branch(VarId(0), 2.7);
        assert_eq!(up.kind, BoundKind::Lower);
        assert_eq!(up.bound, 3.0);

        let c = up.to_constraint();
        assert_eq!(c.op, ComparisonOp::Ge);
        assert_eq!(c.rhs, 3.0);
        assert!(c.is_satisfied(&[3.0], 0.0));
        assert!(!c.is_satisfied(&[2.0], 0.0));
    }

    #[test]
    fn test_branch_children() {
        let root = solved(SearchNode::root(two_var_problem()), vec![2.5, 1.5, 4.0]);

        let floor = root.branch_floor(1, VarId(0)).unwrap();
        let ceil = root.branch_ceil(2, VarId(0)).unwrap();

        assert_eq!(floor.parent_id, Some(0));
        assert_eq!(floor.depth, 1);
        assert!(floor.relaxation.is_none());
        assert_eq!(floor.bound_changes, vec![BoundChange::floor_branch(VarId(0), 2.5)]);
        assert_eq!(ceil.bound_changes, vec![BoundChange::ceil_branch(VarId(0), 2.5)]);

        // Unsolved node has no value to branch on
        assert!(floor.branch_floor(3, VarId(1)).is_none());
    }

    #[test]
    fn test_children_are_independent() {
        let root = solved(SearchNode::root(two_var_problem()), vec![2.5, 1.5, 4.0]);
        let floor = root.branch_floor(1, VarId(0)).unwrap();
        let mut ceil = root.branch_ceil(2, VarId(0)).unwrap();

        ceil.bound_changes.push(BoundChange::floor_branch(VarId(1), 0.5));

        assert!(root.bound_changes.is_empty());
        assert_eq!(floor.bound_changes.len(), 1);
        assert_eq!(ceil.bound_changes.len(), 2);
    }

    #[test]
    fn test_constraints_accumulate() {
        let root = solved(SearchNode::root(two_var_problem()), vec![2.5, 1.5, 4.0]);
        let child = root.branch_floor(1, VarId(0)).unwrap();
        let child = solved(child, vec![2.0, 1.5, 3.5]);
        let grandchild = child.branch_ceil(3, VarId(1)).unwrap();

        assert_eq!(grandchild.depth, 2);
        assert_eq!(&grandchild.bound_changes[..1], &child.bound_changes[..]);

        let lp = grandchild.build();
        assert_eq!(lp.num_rows(), 3 + 2);
        assert_eq!(lp.rhs[3], 2.0);
        assert_eq!(lp.ops[3], ComparisonOp::Le);
        assert_eq!(lp.rhs[4], 2.0);
        assert_eq!(lp.ops[4], ComparisonOp::Ge);
    }

    #[test]
    fn test_is_integral() {
        let prob = two_var_problem();

        // Unsolved node is never integral
        assert!(!SearchNode::root(Arc::clone(&prob)).is_integral(1e-4));

        // Objective holder is continuous and ignored
        let node = solved(SearchNode::root(Arc::clone(&prob)), vec![2.0, 1.0, 3.25]);
        assert!(node.is_integral(1e-4));

        // Within tolerance
        let node = solved(SearchNode::root(Arc::clone(&prob)), vec![1.99995, 1.0, 3.0]);
        assert!(node.is_integral(1e-4));

        // Outside tolerance
        let node = solved(SearchNode::root(Arc::clone(&prob)), vec![2.0, 1.5, 3.5]);
        assert!(!node.is_integral(1e-4));

        // Missing value
        let node = SearchNode::root(prob).with_relaxation(Relaxation {
            objective: 0.0,
            values: vec![1.0],
        });
        assert!(!node.is_integral(1e-4));
    }

    #[test]
    fn test_score_follows_sense() {
        let mut prob = MilpProblem::new(ObjectiveSense::Minimize);
        let x = prob.add_integer_var("x", (0.0, 4.0));
        prob.set_objective_var(x);

        let node = SearchNode::root(Arc::new(prob)).with_relaxation(Relaxation {
            objective: 3.0,
            values: vec![3.0],
        });
        assert_eq!(node.bound(), Some(3.0));
        assert_eq!(node.score(), -3.0);
    }
}
