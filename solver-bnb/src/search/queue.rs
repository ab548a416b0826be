//! Node priority queue for B&B tree exploration.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::SearchNode;
use crate::settings::NodeSelection;

/// Entry in the node queue with priority.
///
/// Ordered by priority, then by insertion sequence (earlier first), so
/// entries with equal priority pop in FIFO order.
struct QueuedNode {
    priority: f64, // Higher = selected first
    seq: u64,
    node: SearchNode,
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue for B&B nodes.
pub struct NodeQueue {
    /// Node selection strategy.
    strategy: NodeSelection,

    /// Priority queue (max-heap by priority).
    heap: BinaryHeap<QueuedNode>,

    /// Next insertion sequence number.
    next_seq: u64,

    /// Count of nodes popped.
    nodes_popped: u64,
}

impl NodeQueue {
    /// Create a new node queue with the given strategy.
    pub fn new(strategy: NodeSelection) -> Self {
        Self {
            strategy,
            heap: BinaryHeap::new(),
            next_seq: 0,
            nodes_popped: 0,
        }
    }

    /// Add a node to the queue. Returns its sequence number.
    pub fn push(&mut self, node: SearchNode) -> u64 {
        let priority = self.compute_priority(&node);
        let seq = self.next_seq;
        self.next_seq += 1;

        self.heap.push(QueuedNode { priority, seq, node });
        seq
    }

    /// Get the next node to process.
    pub fn pop(&mut self) -> Option<SearchNode> {
        let queued = self.heap.pop()?;
        self.nodes_popped += 1;
        Some(queued.node)
    }

    /// Peek at the next node without removing it.
    pub fn peek(&self) -> Option<&SearchNode> {
        self.heap.peek().map(|q| &q.node)
    }

    /// Best (highest) relaxation score across open nodes, -inf if empty.
    pub fn best_bound(&self) -> f64 {
        self.heap
            .iter()
            .map(|q| q.node.score())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Drop nodes that cannot strictly improve on `incumbent_score`.
    ///
    /// Returns the pruned nodes.
    pub fn prune_by_bound(&mut self, incumbent_score: f64) -> Vec<SearchNode> {
        let (kept, pruned): (Vec<QueuedNode>, Vec<QueuedNode>) = self
            .heap
            .drain()
            .partition(|q| q.node.score() > incumbent_score);

        self.heap = kept.into_iter().collect();
        pruned.into_iter().map(|q| q.node).collect()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Get the number of nodes in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Get the total number of nodes added.
    pub fn total_added(&self) -> u64 {
        self.next_seq
    }

    /// Get the total number of nodes popped.
    pub fn total_popped(&self) -> u64 {
        self.nodes_popped
    }

    /// Compute priority for a node based on selection strategy.
    fn compute_priority(&self, node: &SearchNode) -> f64 {
        match self.strategy {
            // Highest relaxation score first
            NodeSelection::BestBound => node.score(),
            // Deepest first
            NodeSelection::DepthFirst => node.depth as f64,
            // Sequence number decides
            NodeSelection::Fifo => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{MilpProblem, ObjectiveSense};
    use crate::oracle::Relaxation;

    fn problem(sense: ObjectiveSense) -> Arc<MilpProblem> {
        let mut prob = MilpProblem::new(sense);
        let x = prob.add_integer_var("x", (0.0, 100.0));
        prob.set_objective_var(x);
        Arc::new(prob)
    }

    fn node(prob: &Arc<MilpProblem>, id: u64, depth: usize, bound: f64) -> SearchNode {
        let mut n = SearchNode::root(Arc::clone(prob)).with_relaxation(Relaxation {
            objective: bound,
            values: vec![bound],
        });
        n.id = id;
        n.depth = depth;
        n
    }

    #[test]
    fn test_best_bound_selection() {
        let prob = problem(ObjectiveSense::Maximize);
        let mut queue = NodeQueue::new(NodeSelection::BestBound);

        queue.push(node(&prob, 1, 0, 10.0));
        queue.push(node(&prob, 2, 0, 5.0));
        queue.push(node(&prob, 3, 0, 15.0));

        assert_eq!(queue.best_bound(), 15.0);
        assert_eq!(queue.peek().map(|n| n.id), Some(3));

        // Highest bound first when maximizing
        assert_eq!(queue.pop().unwrap().id, 3);
        assert_eq!(queue.pop().unwrap().id, 1);
        assert_eq!(queue.pop().unwrap().id, 2);

        assert!(queue.is_empty());
        assert_eq!(queue.best_bound(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_best_bound_minimization() {
        let prob = problem(ObjectiveSense::Minimize);
        let mut queue = NodeQueue::new(NodeSelection::BestBound);

        queue.push(node(&prob, 1, 0, 10.0));
        queue.push(node(&prob, 2, 0, 5.0));

        // Lowest objective first when minimizing
        assert_eq!(queue.pop().unwrap().id, 2);
        assert_eq!(queue.pop().unwrap().id, 1);
    }

    #[test]
    fn test_ties_pop_in_insertion_order() {
        let prob = problem(ObjectiveSense::Maximize);
        let mut queue = NodeQueue::new(NodeSelection::BestBound);

        for id in 0..5 {
            assert_eq!(queue.push(node(&prob, id, 0, 7.0)), id);
        }

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop()).map(|n| n.id).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.total_added(), 5);
        assert_eq!(queue.total_popped(), 5);
    }

    #[test]
    fn test_depth_first_selection() {
        let prob = problem(ObjectiveSense::Maximize);
        let mut queue = NodeQueue::new(NodeSelection::DepthFirst);

        queue.push(node(&prob, 1, 0, 1.0));
        queue.push(node(&prob, 2, 2, 1.0));
        queue.push(node(&prob, 3, 1, 1.0));

        // Deepest first
        assert_eq!(queue.pop().unwrap().id, 2);
        assert_eq!(queue.pop().unwrap().id, 3);
        assert_eq!(queue.pop().unwrap().id, 1);
    }

    #[test]
    fn test_fifo_selection() {
        let prob = problem(ObjectiveSense::Maximize);
        let mut queue = NodeQueue::new(NodeSelection::Fifo);

        queue.push(node(&prob, 1, 0, 1.0));
        queue.push(node(&prob, 2, 3, 50.0));
        queue.push(node(&prob, 3, 1, 20.0));

        assert_eq!(queue.pop().unwrap().id, 1);
        assert_eq!(queue.pop().unwrap().id, 2);
        assert_eq!(queue.pop().unwrap().id, 3);
    }

    #[test]
    fn test_pruning() {
        let prob = problem(ObjectiveSense::Maximize);
        let mut queue = NodeQueue::new(NodeSelection::BestBound);

        for i in 0..5 {
            queue.push(node(&prob, i, 0, i as f64 * 10.0)); // 0, 10, 20, 30, 40
        }

        assert_eq!(queue.len(), 5);

        // Drop nodes that cannot beat 20
        let pruned = queue.prune_by_bound(20.0);
        assert_eq!(pruned.len(), 3); // bounds 0, 10 and 20
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().id, 4);
    }
}
