//! Branch-and-bound search tree management.

mod branching;
mod event;
mod node;
mod queue;
mod tree;

pub use branching::{fractionality, is_fractional, round_to, BranchDecision, BranchingSelector};
pub use event::SearchEvent;
pub use node::{BoundChange, BoundKind, SearchNode};
pub use queue::NodeQueue;
pub use tree::{BranchAndBound, TreeStats};
