//! Simple benchmark to debug the B&B solver
//!
//! Run with: cargo run --release -p solver-bnb --example simple_bench

use solver_bnb::{
    solve_milp, ComparisonOp, LpRelaxation, MicroLpOracle, MilpProblem, MipSettings, ObjectiveSense,
    RelaxationOracle, RelaxationOutcome, VarId,
};
use std::time::Instant;

fn main() {
    println!("=== Simple B&B Solver Test ===\n");

    // Test 1: Very simple binary LP
    test_simple_binary_lp();

    // Test 2: Small knapsack
    test_small_knapsack();
}

/// Simple binary LP:
/// max x0 + x1
/// s.t. x0 + x1 <= 1
///      x0, x1 in {0,1}
fn test_simple_binary_lp() {
    println!("--- Test 1: Simple Binary LP ---");
    println!("max x0 + x1 s.t. x0 + x1 <= 1, x binary");

    let mut prob = MilpProblem::new(ObjectiveSense::Maximize);
    let x0 = prob.add_integer_var("x0", (0.0, 1.0));
    let x1 = prob.add_integer_var("x1", (0.0, 1.0));
    prob.add_constraint([(x0, 1.0), (x1, 1.0)], ComparisonOp::Le, 1.0);
    prob.set_objective([(x0, 1.0), (x1, 1.0)]);

    run_solve(&prob);
}

/// Small knapsack:
/// max 3x0 + 2x1 + 4x2
/// s.t. 2x0 + x1 + 3x2 <= 4
///      x binary
fn test_small_knapsack() {
    println!("--- Test 2: Small Knapsack ---");
    println!("max 3x0 + 2x1 + 4x2 s.t. 2x0 + x1 + 3x2 <= 4, x binary");

    let mut prob = MilpProblem::new(ObjectiveSense::Maximize);
    let x: Vec<VarId> = (0..3)
        .map(|i| prob.add_integer_var(format!("x{}", i), (0.0, 1.0)))
        .collect();
    prob.add_constraint([(x[0], 2.0), (x[1], 1.0), (x[2], 3.0)], ComparisonOp::Le, 4.0);
    prob.set_objective([(x[0], 3.0), (x[1], 2.0), (x[2], 4.0)]);

    run_solve(&prob);
}

fn run_solve(prob: &MilpProblem) {
    // First look at the root relaxation directly
    println!("Testing LP relaxation with microlp...");

    let lp = LpRelaxation::assemble(prob, std::iter::empty());
    match MicroLpOracle::new().solve(&lp) {
        Ok(RelaxationOutcome::Optimal(relax)) => {
            println!("LP Obj: {:.6}", relax.objective);
            println!("LP x: {:?}", relax.values);
        }
        Ok(outcome) => println!("LP Status: {:?}", outcome),
        Err(e) => println!("LP Error: {}", e),
    }

    println!("\nNow testing B&B solver...");

    let settings = MipSettings {
        verbose: true,
        max_nodes: Some(1000),
        log_freq: 1,
        ..Default::default()
    };

    println!("Problem: n={}, m={}", prob.num_vars(), prob.num_constraints());

    let start = Instant::now();
    let result = solve_milp(prob, &settings);
    let elapsed = start.elapsed();

    match result {
        Ok(sol) => {
            println!("Status: {:?}", sol.status);
            if sol.has_solution() {
                println!("Objective: {:.6}", sol.obj_val);
                println!("Solution: {:?}", sol.x);
                println!("Bound: {:.6}", sol.bound);
                println!("Gap: {:.4}%", sol.gap * 100.0);
            }
            println!(
                "Nodes: {}, Relaxations: {}, Pruned (bound/infeasible/failure): {}/{}/{}",
                sol.stats.nodes_explored,
                sol.stats.relaxations_solved,
                sol.stats.nodes_pruned_bound,
                sol.stats.nodes_pruned_infeasible,
                sol.stats.nodes_pruned_solver_failure,
            );
        }
        Err(e) => {
            println!("Error: {}", e);
        }
    }
    println!("Time: {:.3}s\n", elapsed.as_secs_f64());
}
