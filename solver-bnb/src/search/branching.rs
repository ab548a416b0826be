//! Branching variable selection.

use super::SearchNode;
use crate::model::VarId;
use crate::settings::BranchingRule;

/// A branching decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchDecision {
    /// Variable to branch on.
    pub var: VarId,

    /// Current (fractional) value.
    pub value: f64,

    /// Distance to the nearest integer.
    pub fractionality: f64,
}

impl BranchDecision {
    /// Create the (floor, ceiling) children of `node`.
    ///
    /// Returns None if `node` has no relaxed value for the branching variable.
    pub fn children(
        &self,
        node: &SearchNode,
        down_id: u64,
        up_id: u64,
    ) -> Option<(SearchNode, SearchNode)> {
        let down = node.branch_floor(down_id, self.var)?;
        let up = node.branch_ceil(up_id, self.var)?;
        Some((down, up))
    }
}

/// Round `value` to `digits` decimal digits.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}

/// Whether `value`, rounded to `digits` decimal digits, is not an integer.
///
/// Values that are already integral, or too large to scale, are never
/// fractional.
pub fn is_fractional(value: f64, digits: u32) -> bool {
    if value.fract() == 0.0 {
        return false;
    }
    let rounded = round_to(value, digits);
    rounded.is_finite() && rounded.fract() != 0.0
}

/// Fractionality differences below this count as ties.
const TIE_TOL: f64 = 1e-9;

/// Distance of a value to its nearest integer.
pub fn fractionality(value: f64) -> f64 {
    let frac = value.fract().abs();
    frac.min(1.0 - frac)
}

/// Branching variable selector.
#[derive(Debug, Clone)]
pub struct BranchingSelector {
    /// Branching rule to use.
    rule: BranchingRule,

    /// Rounding precision for the fractionality test.
    round_digits: u32,
}

impl BranchingSelector {
    /// Create a new branching selector.
    pub fn new(rule: BranchingRule, round_digits: u32) -> Self {
        Self { rule, round_digits }
    }

    /// Fractional integer variables of a solved node, in declaration order.
    pub fn fractional_vars(&self, node: &SearchNode) -> Vec<BranchDecision> {
        self.candidates(node).collect()
    }

    fn candidates<'a>(&self, node: &'a SearchNode) -> impl Iterator<Item = BranchDecision> + 'a {
        let digits = self.round_digits;
        let values = node.relaxation.as_ref().map_or(&[][..], |r| &r.values[..]);

        node.problem.integer_vars().filter_map(move |var| {
            let value = *values.get(var.0)?;
            is_fractional(value, digits).then(|| BranchDecision {
                var,
                value,
                fractionality: fractionality(value),
            })
        })
    }

    /// Select a branching variable.
    ///
    /// Returns None if no integer variable is fractional.
    pub fn select(&self, node: &SearchNode) -> Option<BranchDecision> {
        match self.rule {
            BranchingRule::FirstFractional => self.select_first_fractional(node),
            BranchingRule::MostFractional => self.select_most_fractional(node),
        }
    }

    /// Select the first fractional variable in declaration order.
    fn select_first_fractional(&self, node: &SearchNode) -> Option<BranchDecision> {
        self.candidates(node).next()
    }

    /// Select variable closest to 0.5 (most fractional). The first one wins ties.
    fn select_most_fractional(&self, node: &SearchNode) -> Option<BranchDecision> {
        self.candidates(node)
            .fold(None, |best: Option<BranchDecision>, d| match best {
                Some(b) if b.fractionality + TIE_TOL >= d.fractionality => Some(b),
                _ => Some(d),
            })
    }
}
