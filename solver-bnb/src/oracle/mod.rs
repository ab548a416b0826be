//! Continuous relaxation oracles.

mod backend;
mod simplex;

pub use backend::{LpRelaxation, OracleError, Relaxation, RelaxationOracle, RelaxationOutcome};
pub use simplex::MicroLpOracle;
