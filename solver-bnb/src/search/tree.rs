//! Branch-and-bound tree controller.

use std::sync::Arc;
use std::time::Instant;

use super::{BranchDecision, BranchingSelector, NodeQueue, SearchEvent, SearchNode};
use crate::error::{MipError, MipResult};
use crate::model::{IncumbentTracker, MilpProblem, MilpSolution, MipStatus};
use crate::oracle::{RelaxationOracle, RelaxationOutcome};
use crate::settings::MipSettings;

/// Per-solve counters.
#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    nodes_explored: u64,
    nodes_branched: u64,
    pruned_infeasible: u64,
    pruned_solver_failure: u64,
    pruned_bound: u64,
    integral_candidates: u64,
    relaxations_solved: u64,
    max_depth: usize,
}

/// Branch-and-bound tree controller.
///
/// Manages the B&B tree, node queue, incumbent, and termination. Search
/// state (sequence counter, node IDs, incumbent) belongs to the instance, so
/// independent solves do not interfere.
pub struct BranchAndBound {
    /// Problem being solved.
    problem: Arc<MilpProblem>,

    /// Node queue.
    queue: NodeQueue,

    /// Branching variable selector.
    branching: BranchingSelector,

    /// Incumbent solution tracker.
    pub incumbent: IncumbentTracker,

    /// Next node ID to assign.
    next_node_id: u64,

    /// Search counters.
    counters: Counters,

    /// Recorded events (if enabled).
    trace: Vec<SearchEvent>,

    /// Start time.
    start_time: Option<Instant>,

    /// Settings.
    settings: MipSettings,
}

impl BranchAndBound {
    /// Create a new B&B controller.
    ///
    /// Rejects malformed problems and settings before any search happens.
    pub fn new(problem: Arc<MilpProblem>, settings: MipSettings) -> MipResult<Self> {
        problem.validate()?;
        settings.validate()?;

        Ok(Self {
            queue: NodeQueue::new(settings.node_selection),
            branching: BranchingSelector::new(settings.branching_rule, settings.round_digits),
            incumbent: IncumbentTracker::new(),
            next_node_id: 1, // 0 reserved for root
            counters: Counters::default(),
            trace: Vec::new(),
            start_time: None,
            problem,
            settings,
        })
    }

    /// Run the search to completion or until a limit is hit.
    ///
    /// Root infeasibility is reported through the solution status. An oracle
    /// failure on the root relaxation is an error, since nothing is known
    /// about the problem.
    pub fn solve<O: RelaxationOracle + ?Sized>(&mut self, oracle: &O) -> MipResult<MilpSolution> {
        self.reset();
        self.start_time = Some(Instant::now());

        let root = SearchNode::root(Arc::clone(&self.problem));
        self.counters.relaxations_solved += 1;
        let relaxation = match oracle.solve(&root.build())? {
            RelaxationOutcome::Optimal(relaxation) => relaxation,
            RelaxationOutcome::Infeasible => {
                log::info!("Root relaxation infeasible");
                return Ok(self.finalize(MipStatus::Infeasible));
            }
            RelaxationOutcome::Unbounded => {
                log::info!("Root relaxation unbounded");
                return Ok(self.finalize(MipStatus::Unbounded));
            }
        };

        self.initialize(root.with_relaxation(relaxation));

        let status = loop {
            if let Some(status) = self.check_termination() {
                break status;
            }
            if let Some(node) = self.next_node() {
                self.process_node(oracle, node)?;
                self.log_progress();
            }
        };

        let solution = self.finalize(status);
        log::info!(
            "B&B finished: status={:?}, obj={:.6e}, nodes={}, time={}ms",
            solution.status,
            solution.obj_val,
            solution.stats.nodes_explored,
            solution.solve_time_ms,
        );
        Ok(solution)
    }

    /// Initialize with the solved root node.
    pub fn initialize(&mut self, root: SearchNode) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        self.enqueue(root);
    }

    /// Get the next node to process.
    pub fn next_node(&mut self) -> Option<SearchNode> {
        let node = self.queue.pop()?;
        self.emit(SearchEvent::Popped {
            node: node.id,
            bound: node.bound().unwrap_or(f64::NAN),
        });
        Some(node)
    }

    /// Add a solved node to the queue.
    pub fn enqueue(&mut self, node: SearchNode) {
        self.emit(SearchEvent::Pushed {
            node: node.id,
            parent: node.parent_id,
            bound: node.bound().unwrap_or(f64::NAN),
        });
        self.queue.push(node);
    }

    /// Create child nodes from a branching decision.
    ///
    /// Returns the two child nodes (floor, ceiling).
    pub fn branch(
        &mut self,
        parent: &SearchNode,
        decision: BranchDecision,
    ) -> MipResult<(SearchNode, SearchNode)> {
        let down_id = self.next_node_id;
        let up_id = self.next_node_id + 1;
        self.next_node_id += 2;

        decision.children(parent, down_id, up_id).ok_or_else(|| {
            MipError::InternalError(format!(
                "node {} has no relaxed value for {}",
                parent.id, decision.var
            ))
        })
    }

    /// Process one popped node: prune, branch, or record an integral solution.
    fn process_node<O: RelaxationOracle + ?Sized>(
        &mut self,
        oracle: &O,
        node: SearchNode,
    ) -> MipResult<()> {
        self.counters.nodes_explored += 1;
        self.counters.max_depth = self.counters.max_depth.max(node.depth);

        let bound = node.bound().ok_or_else(|| {
            MipError::InternalError(format!("node {} queued without a relaxation", node.id))
        })?;

        // Stale nodes that can no longer strictly improve
        if !self.settings.exhaustive
            && self.incumbent.has_incumbent()
            && !self.incumbent.improves(node.score())
        {
            self.prune_by_bound(node.id, bound);
            return Ok(());
        }

        match self.branching.select(&node) {
            Some(decision) => {
                self.counters.nodes_branched += 1;
                self.emit(SearchEvent::Branched {
                    node: node.id,
                    var: decision.var,
                    value: decision.value,
                });

                let (down, up) = self.branch(&node, decision)?;
                self.process_child(oracle, down);
                self.process_child(oracle, up);
            }
            None => {
                if !node.is_integral(self.settings.int_feas_tol) {
                    log::warn!(
                        "node {} passed the rounding test but exceeds int_feas_tol",
                        node.id
                    );
                }
                self.counters.integral_candidates += 1;
                self.emit(SearchEvent::IntegralCandidate {
                    node: node.id,
                    objective: bound,
                });

                if let Some(relaxation) = &node.relaxation {
                    self.update_incumbent(&relaxation.values, bound, node.id);
                }
            }
        }

        Ok(())
    }

    /// Solve a child relaxation and queue the child unless it is pruned.
    ///
    /// Oracle failures prune the child; they never abort the search.
    fn process_child<O: RelaxationOracle + ?Sized>(&mut self, oracle: &O, child: SearchNode) {
        self.counters.relaxations_solved += 1;

        match oracle.solve(&child.build()) {
            Ok(RelaxationOutcome::Optimal(relaxation)) => {
                let child = child.with_relaxation(relaxation);
                if child.score() < self.incumbent.score {
                    let bound = child.bound().unwrap_or(f64::NAN);
                    self.prune_by_bound(child.id, bound);
                } else {
                    self.enqueue(child);
                }
            }
            Ok(RelaxationOutcome::Infeasible) => {
                self.counters.pruned_infeasible += 1;
                self.emit(SearchEvent::PrunedInfeasible { node: child.id });
            }
            Ok(RelaxationOutcome::Unbounded) => {
                self.prune_solver_failure(child.id, "unbounded relaxation below a bounded parent");
            }
            Err(e) => {
                self.prune_solver_failure(child.id, &e.to_string());
            }
        }
    }

    fn prune_by_bound(&mut self, node: u64, bound: f64) {
        self.counters.pruned_bound += 1;
        self.emit(SearchEvent::PrunedByBound {
            node,
            bound,
            incumbent: self.incumbent.obj_val,
        });
    }

    fn prune_solver_failure(&mut self, node: u64, reason: &str) {
        self.counters.pruned_solver_failure += 1;
        self.emit(SearchEvent::PrunedSolverFailure {
            node,
            reason: reason.to_string(),
        });
    }

    /// Update incumbent with a new solution.
    ///
    /// Returns true if incumbent was improved.
    pub fn update_incumbent(&mut self, x: &[f64], obj: f64, node_id: u64) -> bool {
        let score = self.problem.sense.score(obj);
        let improved = self.incumbent.update(x, obj, score, node_id);

        if improved {
            self.emit(SearchEvent::IncumbentUpdated {
                node: node_id,
                objective: obj,
            });

            // Prune nodes dominated by new incumbent
            let mut pruned = 0;
            if !self.settings.exhaustive {
                for node in self.queue.prune_by_bound(score) {
                    self.prune_by_bound(node.id, node.bound().unwrap_or(f64::NAN));
                    pruned += 1;
                }
            }

            if self.settings.verbose {
                log::info!("New incumbent: obj={:.6e}, pruned {} nodes", obj, pruned);
            }
        }

        improved
    }

    /// Get the current optimality gap.
    pub fn gap(&self) -> f64 {
        MilpSolution::compute_gap(self.incumbent.obj_val, self.best_bound())
    }

    /// Get the best bound over the open nodes and the incumbent.
    pub fn best_bound(&self) -> f64 {
        let score = self.queue.best_bound().max(self.incumbent.score);
        self.problem.sense.score(score)
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    /// Check if time limit is exceeded.
    pub fn time_limit_exceeded(&self) -> bool {
        if let Some(limit) = self.settings.time_limit_ms {
            self.elapsed_ms() >= limit
        } else {
            false
        }
    }

    /// Check termination conditions.
    ///
    /// Returns Some(status) if we should terminate, None otherwise.
    pub fn check_termination(&self) -> Option<MipStatus> {
        // Queue empty: search complete
        if self.queue.is_empty() {
            return Some(if self.incumbent.has_incumbent() {
                MipStatus::Optimal
            } else {
                MipStatus::Infeasible
            });
        }

        // Time limit
        if self.time_limit_exceeded() {
            return Some(MipStatus::TimeLimit);
        }

        // Node limit
        if let Some(max_nodes) = self.settings.max_nodes {
            if self.counters.nodes_explored >= max_nodes {
                return Some(MipStatus::NodeLimit);
            }
        }

        None
    }

    /// Finalize the solve and return the solution.
    pub fn finalize(&self, status: MipStatus) -> MilpSolution {
        let bound = match status {
            MipStatus::Optimal => self.incumbent.obj_val,
            MipStatus::Infeasible => f64::NAN,
            MipStatus::Unbounded => self.problem.sense.score(f64::INFINITY),
            MipStatus::NodeLimit | MipStatus::TimeLimit => self.best_bound(),
        };

        MilpSolution {
            status,
            x: self.incumbent.solution.clone().unwrap_or_default(),
            obj_val: self.incumbent.obj_val,
            bound,
            gap: MilpSolution::compute_gap(self.incumbent.obj_val, bound),
            stats: self.stats(),
            solve_time_ms: self.elapsed_ms(),
        }
    }

    /// Log progress (if verbose).
    pub fn log_progress(&self) {
        if !self.settings.verbose {
            return;
        }

        if self.counters.nodes_explored % self.settings.log_freq != 0 {
            return;
        }

        log::info!(
            "Nodes: {} ({} open) | Bound: {:.6e} | Incumbent: {:.6e} | Gap: {:.2}% | Time: {:.1}s",
            self.counters.nodes_explored,
            self.queue.len(),
            self.best_bound(),
            self.incumbent.obj_val,
            self.gap() * 100.0,
            self.elapsed_ms() as f64 / 1000.0,
        );
    }

    /// Get statistics for display.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            nodes_explored: self.counters.nodes_explored,
            nodes_branched: self.counters.nodes_branched,
            nodes_pruned_infeasible: self.counters.pruned_infeasible,
            nodes_pruned_solver_failure: self.counters.pruned_solver_failure,
            nodes_pruned_bound: self.counters.pruned_bound,
            integral_candidates: self.counters.integral_candidates,
            incumbent_updates: self.incumbent.update_count,
            relaxations_solved: self.counters.relaxations_solved,
            nodes_open: self.queue.len() as u64,
            max_depth: self.counters.max_depth,
            elapsed_ms: self.elapsed_ms(),
        }
    }

    /// Events recorded during the last solve (empty unless `record_trace`).
    pub fn trace(&self) -> &[SearchEvent] {
        &self.trace
    }

    fn emit(&mut self, event: SearchEvent) {
        event.log();
        if self.settings.record_trace {
            self.trace.push(event);
        }
    }

    fn reset(&mut self) {
        self.queue = NodeQueue::new(self.settings.node_selection);
        self.incumbent = IncumbentTracker::new();
        self.next_node_id = 1;
        self.counters = Counters::default();
        self.trace.clear();
        self.start_time = None;
    }
}

/// Statistics from the B&B tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStats {
    /// Nodes popped from the frontier.
    pub nodes_explored: u64,
    /// Nodes split into two children.
    pub nodes_branched: u64,
    /// Children whose relaxation was infeasible.
    pub nodes_pruned_infeasible: u64,
    /// Children dropped because the oracle failed.
    pub nodes_pruned_solver_failure: u64,
    /// Nodes that could not improve on the incumbent.
    pub nodes_pruned_bound: u64,
    /// Popped nodes with an integral relaxation.
    pub integral_candidates: u64,
    /// Times the incumbent improved.
    pub incumbent_updates: u64,
    /// Oracle calls, root included.
    pub relaxations_solved: u64,
    /// Nodes left in the frontier.
    pub nodes_open: u64,
    /// Deepest node popped.
    pub max_depth: usize,
    /// Wall time.
    pub elapsed_ms: u64,
}
