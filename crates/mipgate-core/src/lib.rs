//! Engine-independent building blocks for mipgate.
//!
//! - [`MipSolver`]: trait implemented by each engine backend
//! - [`ModelRegistry`]: validated record of variables, constraints and objective
//! - [`LinearExpr`], [`Constraint`], [`Objective`]: model description
//! - [`MipSolution`], [`SolverStatus`]: solve outcome
//! - [`SolverConfig`], [`SolverError`]: configuration and errors

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod expr;
pub mod fixtures;
pub mod ids;
pub mod logging;
pub mod registry;
pub mod solution;
pub mod status;
pub mod traits;
pub mod types;

pub use config::{SolverConfig, validate_time_limit};
pub use error::SolverError;
pub use expr::{Constraint, LinearExpr, Objective, Row};
pub use ids::{ConstrId, VarId};
pub use registry::ModelRegistry;
pub use solution::MipSolution;
pub use status::SolverStatus;
pub use traits::MipSolver;
pub use types::{ConstraintSense, ObjectiveSense, VarSpec, VarType};
