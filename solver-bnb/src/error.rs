//! Error types for the branch-and-bound solver.

use thiserror::Error;

use crate::oracle::OracleError;

/// Errors that can occur during MILP solving.
///
/// Infeasible or failed child relaxations are not errors: they prune the
/// subtree and the search continues.
#[derive(Error, Debug)]
pub enum MipError {
    /// Problem validation failed
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// Settings validation failed
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The relaxation oracle failed on the root relaxation
    #[error("Root relaxation failed: {0}")]
    Oracle(#[from] OracleError),

    /// Internal solver error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type for MILP operations.
pub type MipResult<T> = Result<T, MipError>;
