//! Gurobi backend for mipgate.
//!
//! The real adapter is compiled only with the `gurobi` feature, which links
//! against a local Gurobi installation. Without it, [`GurobiSolver::new`]
//! reports [`mipgate_core::SolverError::EngineUnavailable`] so callers can fall
//! back to another engine at runtime.

/// Name reported by [`mipgate_core::MipSolver::engine_name`].
pub const ENGINE_NAME: &str = "gurobi";

#[cfg(feature = "gurobi")]
mod solver;
#[cfg(feature = "gurobi")]
pub use solver::GurobiSolver;

#[cfg(not(feature = "gurobi"))]
mod unavailable;
#[cfg(not(feature = "gurobi"))]
pub use unavailable::GurobiSolver;

/// Whether this build links Gurobi.
pub const fn is_available() -> bool {
    cfg!(feature = "gurobi")
}
