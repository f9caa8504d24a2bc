//! Placeholder used when the crate is built without the `gurobi` feature.

use crate::ENGINE_NAME;
use mipgate_core::{
    ConstrId, Constraint, MipSolution, MipSolver, ModelRegistry, Objective, SolverConfig,
    SolverError, VarId, VarSpec, validate_time_limit,
};
use tracing::warn;

const NOT_BUILT: &str = "mipgate-gurobi was built without the `gurobi` feature";

fn unavailable() -> SolverError {
    SolverError::EngineUnavailable(NOT_BUILT.to_string())
}

/// Gurobi adapter stand-in. It can never be constructed.
#[derive(Debug)]
pub struct GurobiSolver {
    registry: ModelRegistry,
    config: SolverConfig,
}

impl GurobiSolver {
    pub fn new() -> Result<Self, SolverError> {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(_config: SolverConfig) -> Result<Self, SolverError> {
        warn!(
            component = "solver",
            operation = "init",
            status = "error",
            solver = ENGINE_NAME,
            "Gurobi support not compiled in"
        );
        Err(unavailable())
    }
}

impl MipSolver for GurobiSolver {
    fn engine_name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn add_vars(&mut self, specs: &[VarSpec]) -> Result<Vec<VarId>, SolverError> {
        self.registry.add_vars(specs)
    }

    fn add_constr(&mut self, constraint: Constraint) -> Result<ConstrId, SolverError> {
        self.registry.add_constraint(constraint)
    }

    fn set_objective(&mut self, objective: Objective) -> Result<(), SolverError> {
        self.registry.set_objective(objective).map(|_| ())
    }

    fn show_log(&mut self, show: bool) {
        self.config.show_log = Some(show);
    }

    fn set_time_limit(&mut self, seconds: f64) -> Result<(), SolverError> {
        validate_time_limit(seconds)?;
        self.config.time_limit = Some(seconds);
        Ok(())
    }

    fn time_limit(&self) -> Option<f64> {
        self.config.time_limit.filter(|limit| limit.is_finite())
    }

    fn configure(&mut self, config: SolverConfig) -> Result<(), SolverError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    fn optimize(&mut self) -> Result<MipSolution, SolverError> {
        Err(unavailable())
    }

    fn registry(&self) -> &ModelRegistry {
        &self.registry
    }
}
