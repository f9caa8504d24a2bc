//! HiGHS implementation of [`MipSolver`].

use crate::ffi::{
    HighsModel, HighsModelError, HighsOption, HighsStatus, ObjectiveSense as HighsSense,
};
use crate::status::{highs_status_string, highs_to_solver_status};
use mipgate_core::diagnostics::{capture_rss_bytes, rss_delta};
use mipgate_core::{
    ConstrId, Constraint, MipSolution, MipSolver, ModelRegistry, Objective, ObjectiveSense,
    SolverConfig, SolverError, SolverStatus, VarId, VarSpec, validate_time_limit,
};
use std::time::Instant;
use tracing::{debug, trace, warn};

const ENGINE_NAME: &str = "highs";

fn highs_model_error(err: HighsModelError) -> SolverError {
    SolverError::Engine(err.to_string())
}

/// MIP adapter backed by HiGHS.
///
/// Variables, constraints and the objective are recorded in a
/// [`ModelRegistry`]; every `optimize` lowers the registry into a fresh HiGHS
/// instance that is released before the call returns.
#[derive(Debug, Default)]
pub struct HighsSolver {
    registry: ModelRegistry,
    config: SolverConfig,
}

impl HighsSolver {
    pub fn new() -> Self {
        debug!(
            component = "solver",
            operation = "init",
            status = "success",
            solver = ENGINE_NAME,
            "Creating HiGHS adapter"
        );
        Self::default()
    }

    /// Create an adapter with a validated configuration.
    pub fn with_config(config: SolverConfig) -> Result<Self, SolverError> {
        let mut solver = Self::new();
        solver.configure(config)?;
        Ok(solver)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn update_config(&mut self, update: impl FnOnce(SolverConfig) -> SolverConfig) {
        self.config = update(std::mem::take(&mut self.config));
    }
}

impl MipSolver for HighsSolver {
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
        let previous = self.registry.set_objective(objective)?;
        if previous.is_some() {
            debug!(
                component = "solver",
                operation = "set_objective",
                status = "success",
                "Replaced previous objective"
            );
        }
        Ok(())
    }

    fn show_log(&mut self, show: bool) {
        self.update_config(|config| config.with_show_log(show));
    }

    fn set_time_limit(&mut self, seconds: f64) -> Result<(), SolverError> {
        validate_time_limit(seconds)?;
        self.update_config(|config| config.with_time_limit(seconds));
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
        solve_registry(&self.registry, &self.config)
            .map(|solution| solution.with_var_types(self.registry.var_types()))
    }

    fn registry(&self) -> &ModelRegistry {
        &self.registry
    }
}

fn apply_solver_config(highs_model: &mut HighsModel, config: &SolverConfig) {
    let show_log = config.show_log_enabled();
    if show_log || config.log_file.is_some() {
        highs_model.set_option("output_flag", HighsOption::Bool(true));
        highs_model.set_option("log_to_console", HighsOption::Bool(show_log));
    }
    if let Some(path) = &config.log_file {
        highs_model.set_option(
            "log_file",
            HighsOption::Str(path.to_string_lossy().into_owned()),
        );
    }
    if let Some(limit) = config.time_limit {
        highs_model.set_option("time_limit", HighsOption::Float(limit));
    }
    if let Some(gap) = config.mip_gap {
        highs_model.set_option("mip_rel_gap", HighsOption::Float(gap));
    }
    if let Some(threads) = config.threads {
        highs_model.set_option(
            "threads",
            HighsOption::Int(i32::try_from(threads).unwrap_or(i32::MAX)),
        );
    }
}

fn objective_coefficients(registry: &ModelRegistry) -> Vec<f64> {
    let mut coeffs = vec![0.0; registry.num_vars()];
    if let Some(objective) = registry.objective() {
        for (var, coeff) in objective.expr().normalized().terms() {
            if let Some(slot) = coeffs.get_mut(var.index()) {
                *slot = *coeff;
            }
        }
    }
    coeffs
}

fn add_columns(registry: &ModelRegistry, highs_model: &mut HighsModel) {
    let coeffs = objective_coefficients(registry);
    for (index, (spec, coeff)) in registry.variables().iter().zip(coeffs).enumerate() {
        // Binary columns are integer columns; bounds already lie in [0, 1].
        if spec.var_type.is_integral() {
            highs_model.add_integer_col(spec.lower, spec.upper, coeff);
        } else {
            highs_model.add_col(spec.lower, spec.upper, coeff);
        }
        trace!(
            component = "solver",
            operation = "add_variable",
            status = "success",
            col_idx = index,
            lower = spec.lower,
            upper = spec.upper,
            obj_coeff = coeff,
            var_type = spec.var_type.as_str(),
            "Added variable to HiGHS"
        );
    }
    debug!(
        component = "solver",
        operation = "add_variables",
        status = "success",
        num_vars = registry.num_vars(),
        "Added all variables to HiGHS"
    );
}

fn add_rows(registry: &ModelRegistry, highs_model: &mut HighsModel) -> Result<(), SolverError> {
    for (index, constraint) in registry.constraints().iter().enumerate() {
        let row = constraint.to_row();
        let (columns, coefficients): (Vec<usize>, Vec<f64>) = row
            .terms
            .iter()
            .map(|(var, coeff)| (var.index(), *coeff))
            .unzip();
        highs_model
            .add_row(row.lower, row.upper, &columns, &coefficients)
            .map_err(highs_model_error)?;
        trace!(
            component = "solver",
            operation = "add_constraint",
            status = "success",
            constraint_id = index,
            lower = row.lower,
            upper = row.upper,
            num_coeffs = columns.len(),
            "Added constraint to HiGHS"
        );
    }
    debug!(
        component = "solver",
        operation = "add_constraints",
        status = "success",
        num_constraints = registry.num_constraints(),
        "Added all constraints to HiGHS"
    );
    Ok(())
}

/// Lower the registry into HiGHS, solve and translate the outcome.
fn solve_registry(
    registry: &ModelRegistry,
    config: &SolverConfig,
) -> Result<MipSolution, SolverError> {
    if registry.num_vars() == 0 {
        warn!(
            component = "solver",
            operation = "solve",
            status = "error",
            solver = ENGINE_NAME,
            "Refusing to solve a model without variables"
        );
        return Err(SolverError::EmptyModel);
    }

    let solver_version = crate::ffi::highs_version().unwrap_or_else(|| "unknown".to_string());
    let rss_before = capture_rss_bytes("solve_start");
    let solve_started = Instant::now();

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = ENGINE_NAME,
        solver_version = %solver_version,
        model_name = config.model_name(),
        num_vars = registry.num_vars(),
        num_constraints = registry.num_constraints(),
        rss_bytes = ?rss_before,
        "Starting solve process"
    );

    let (sense, offset) = match registry.objective() {
        Some(objective) => (objective.sense(), objective.offset()),
        None => {
            debug!(
                component = "solver",
                operation = "solve",
                status = "success",
                "No objective set; solving as feasibility problem"
            );
            (ObjectiveSense::Minimize, 0.0)
        }
    };

    let mut highs_model = HighsModel::new();
    apply_solver_config(&mut highs_model, config);
    highs_model.set_objective_sense(match sense {
        ObjectiveSense::Minimize => HighsSense::Minimize,
        ObjectiveSense::Maximize => HighsSense::Maximize,
    });
    add_columns(registry, &mut highs_model);
    add_rows(registry, &mut highs_model)?;

    let highs_status = highs_model.solve();
    let solve_time_seconds = solve_started.elapsed().as_secs_f64();
    let rss_after = capture_rss_bytes("solve_end");
    let status = highs_to_solver_status(highs_status);
    let has_primal = highs_model.has_primal_solution();
    let mip_gap = highs_model.mip_gap();
    let mip_nodes = highs_model.mip_node_count();

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = ENGINE_NAME,
        solver_version = %solver_version,
        solver_status = highs_status_string(highs_status),
        has_primal,
        mip_gap,
        mip_nodes,
        duration_ms = solve_time_seconds * 1000.0,
        rss_bytes = ?rss_after,
        rss_delta_bytes = ?rss_delta(rss_before, rss_after),
        "HiGHS solve completed"
    );

    let has_assignment = match highs_status {
        HighsStatus::Optimal => true,
        HighsStatus::ReachedTimeLimit => has_primal,
        _ => false,
    };

    if !has_assignment {
        if status == SolverStatus::Error {
            warn!(
                component = "solver",
                operation = "solve",
                status = "warn",
                solver = ENGINE_NAME,
                solver_status = highs_status_string(highs_status),
                "HiGHS stopped without a usable result"
            );
        }
        return Ok(MipSolution::without_assignment(status, solve_time_seconds));
    }

    if status == SolverStatus::TimeLimit {
        warn!(
            component = "solver",
            operation = "solve",
            status = "warn",
            solver = ENGINE_NAME,
            mip_gap,
            duration_ms = solve_time_seconds * 1000.0,
            "Time limit reached; returning best solution found"
        );
    }

    let values = highs_model.col_values().map_err(highs_model_error)?;
    let objective_value = highs_model.objective_value().map_err(highs_model_error)? + offset;

    debug!(
        component = "solver",
        operation = "extract_solution",
        status = "success",
        objective_value,
        num_values = values.len(),
        "Solution extracted"
    );

    Ok(MipSolution {
        status,
        values: Some(values),
        objective_value: Some(objective_value),
        mip_gap: mip_gap.is_finite().then_some(mip_gap),
        solve_time_seconds,
        var_types: Vec::new(),
    })
}
