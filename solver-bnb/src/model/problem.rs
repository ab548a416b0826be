//! MILP problem representation.

use std::fmt;

use crate::error::{MipError, MipResult};

/// A reference to a variable, by its position in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

impl VarId {
    /// Index of the variable in declaration order.
    pub fn idx(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Integrality requirement of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Any real value within bounds.
    Continuous,

    /// Integer value within bounds.
    Integer,
}

/// A declared decision variable.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Name used in logs.
    pub name: String,

    /// Integrality requirement.
    pub kind: VarKind,

    /// Lower bound (may be -inf).
    pub lower: f64,

    /// Upper bound (may be +inf).
    pub upper: f64,
}

impl Variable {
    /// Whether the variable must take an integer value.
    pub fn is_integer(&self) -> bool {
        self.kind == VarKind::Integer
    }
}

/// Relation between the two sides of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// lhs <= rhs
    Le,

    /// lhs >= rhs
    Ge,

    /// lhs == rhs
    Eq,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComparisonOp::Le => "<=",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Eq => "==",
        };
        f.write_str(s)
    }
}

/// A linear expression: sum of coefficient * variable plus a constant.
///
/// A variable may appear in several terms; its coefficients are summed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    /// (variable, coefficient) terms.
    pub terms: Vec<(VarId, f64)>,

    /// Constant offset.
    pub constant: f64,
}

impl LinearExpr {
    /// Create an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expression consisting of a single variable with coefficient 1.
    pub fn var(var: VarId) -> Self {
        Self {
            terms: vec![(var, 1.0)],
            constant: 0.0,
        }
    }

    /// Add a term.
    pub fn add(&mut self, var: VarId, coef: f64) {
        self.terms.push((var, coef));
    }

    /// Builder form of [`LinearExpr::add`].
    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.add(var, coef);
        self
    }

    /// Set the constant offset.
    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    /// Evaluate the expression at a point.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * x[v.0])
            .sum::<f64>()
            + self.constant
    }

    /// Dense coefficient vector of length `n` (duplicates summed).
    pub fn dense_coefs(&self, n: usize) -> Vec<f64> {
        let mut coefs = vec![0.0; n];
        for &(v, c) in &self.terms {
            coefs[v.0] += c;
        }
        coefs
    }
}

impl<I: IntoIterator<Item = (VarId, f64)>> From<I> for LinearExpr {
    fn from(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
            constant: 0.0,
        }
    }
}

/// A linear constraint: expr (op) rhs.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Left-hand side.
    pub expr: LinearExpr,

    /// Relation.
    pub op: ComparisonOp,

    /// Right-hand side.
    pub rhs: f64,

    /// Optional name for debugging.
    pub name: Option<String>,
}

impl Constraint {
    /// Create a new constraint.
    pub fn new(expr: impl Into<LinearExpr>, op: ComparisonOp, rhs: f64) -> Self {
        Self {
            expr: expr.into(),
            op,
            rhs,
            name: None,
        }
    }

    /// Create a constraint with a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Right-hand side after moving the expression constant across.
    pub fn effective_rhs(&self) -> f64 {
        self.rhs - self.expr.constant
    }

    /// Check whether a point satisfies the constraint within `tol`.
    pub fn is_satisfied(&self, x: &[f64], tol: f64) -> bool {
        let lhs = self.expr.evaluate(x);
        match self.op {
            ComparisonOp::Le => lhs <= self.rhs + tol,
            ComparisonOp::Ge => lhs >= self.rhs - tol,
            ComparisonOp::Eq => (lhs - self.rhs).abs() <= tol,
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    /// Maximize the objective.
    #[default]
    Maximize,

    /// Minimize the objective.
    Minimize,
}

impl ObjectiveSense {
    /// Map an objective value into "larger is better" space.
    pub fn score(&self, obj: f64) -> f64 {
        match self {
            ObjectiveSense::Maximize => obj,
            ObjectiveSense::Minimize => -obj,
        }
    }
}

/// Mixed-integer linear program.
#[derive(Debug, Clone, Default)]
pub struct MilpProblem {
    /// Optimization direction.
    pub sense: ObjectiveSense,

    /// Variables in declaration order.
    pub variables: Vec<Variable>,

    /// Linear constraints.
    pub constraints: Vec<Constraint>,

    /// Objective expression (required before solving).
    pub objective: Option<LinearExpr>,
}

impl MilpProblem {
    /// Create an empty problem with the given direction.
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            sense,
            ..Default::default()
        }
    }

    /// Declare a variable.
    pub fn add_var(
        &mut self,
        name: impl Into<String>,
        kind: VarKind,
        (lower, upper): (f64, f64),
    ) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            kind,
            lower,
            upper,
        });
        id
    }

    /// Declare an integer variable.
    pub fn add_integer_var(&mut self, name: impl Into<String>, bounds: (f64, f64)) -> VarId {
        self.add_var(name, VarKind::Integer, bounds)
    }

    /// Declare a continuous variable.
    pub fn add_continuous_var(&mut self, name: impl Into<String>, bounds: (f64, f64)) -> VarId {
        self.add_var(name, VarKind::Continuous, bounds)
    }

    /// Add a constraint.
    pub fn add_constraint(&mut self, expr: impl Into<LinearExpr>, op: ComparisonOp, rhs: f64) {
        self.constraints.push(Constraint::new(expr, op, rhs));
    }

    /// Set the objective expression.
    pub fn set_objective(&mut self, expr: impl Into<LinearExpr>) {
        self.objective = Some(expr.into());
    }

    /// Use a single variable as the objective.
    ///
    /// The variable is typically continuous and tied to the real objective
    /// through an equality constraint; it takes no part in integrality checks.
    pub fn set_objective_var(&mut self, var: VarId) {
        self.objective = Some(LinearExpr::var(var));
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Indices of integer variables in declaration order.
    pub fn integer_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_integer())
            .map(|(i, _)| VarId(i))
    }

    /// Number of integer variables.
    pub fn num_integers(&self) -> usize {
        self.integer_vars().count()
    }

    /// Objective value at a point (0 if no objective is set).
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective.as_ref().map_or(0.0, |o| o.evaluate(x))
    }

    /// Check bounds, constraints and integrality of a point.
    pub fn is_feasible(&self, x: &[f64], tol: f64) -> bool {
        if x.len() != self.num_vars() {
            return false;
        }
        let in_bounds = self
            .variables
            .iter()
            .zip(x)
            .all(|(v, &xi)| xi >= v.lower - tol && xi <= v.upper + tol);
        let integral = self
            .variables
            .iter()
            .zip(x)
            .filter(|(v, _)| v.is_integer())
            .all(|(_, &xi)| (xi - xi.round()).abs() <= tol);
        in_bounds && integral && self.constraints.iter().all(|c| c.is_satisfied(x, tol))
    }

    /// Reject malformed problem definitions.
    pub fn validate(&self) -> MipResult<()> {
        let n = self.num_vars();
        if n == 0 {
            return Err(MipError::InvalidProblem("problem has no variables".to_string()));
        }

        for (i, v) in self.variables.iter().enumerate() {
            if v.lower.is_nan() || v.upper.is_nan() {
                return Err(MipError::InvalidProblem(format!(
                    "variable {} ({}) has a NaN bound",
                    i, v.name
                )));
            }
            if v.lower > v.upper {
                return Err(MipError::InvalidProblem(format!(
                    "variable {} ({}) has lower bound {} above upper bound {}",
                    i, v.name, v.lower, v.upper
                )));
            }
        }

        let objective = self
            .objective
            .as_ref()
            .ok_or_else(|| MipError::InvalidProblem("objective is not set".to_string()))?;
        check_expr(objective, n, "objective")?;

        for (i, c) in self.constraints.iter().enumerate() {
            let what = match &c.name {
                Some(name) => format!("constraint {} ({})", i, name),
                None => format!("constraint {}", i),
            };
            check_expr(&c.expr, n, &what)?;
            if !c.rhs.is_finite() {
                return Err(MipError::InvalidProblem(format!(
                    "{} has non-finite right-hand side {}",
                    what, c.rhs
                )));
            }
        }

        Ok(())
    }
}

fn check_expr(expr: &LinearExpr, n: usize, what: &str) -> MipResult<()> {
    for &(var, coef) in &expr.terms {
        if var.0 >= n {
            return Err(MipError::InvalidProblem(format!(
                "{} references variable {} but only {} variables exist",
                what, var.0, n
            )));
        }
        if !coef.is_finite() {
            return Err(MipError::InvalidProblem(format!(
                "{} has non-finite coefficient {} on {}",
                what, coef, var
            )));
        }
    }
    if !expr.constant.is_finite() {
        return Err(MipError::InvalidProblem(format!(
            "{} has non-finite constant {}",
            what, expr.constant
        )));
    }
    Ok(())
}
