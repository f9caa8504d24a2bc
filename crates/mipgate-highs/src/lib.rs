//! HiGHS backend for mipgate.
//!
//! [`HighsSolver`] implements [`mipgate_core::MipSolver`] on top of the
//! open-source HiGHS engine. It is the default backend and needs no license.

pub mod ffi;
pub mod solver;
mod status;

pub use ffi::{HighsModel, HighsModelError, HighsOption, HighsStatus, highs_version};
pub use solver::HighsSolver;
