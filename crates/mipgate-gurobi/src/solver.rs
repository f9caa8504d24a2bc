//! Gurobi implementation of [`MipSolver`].
//!
//! Unlike the HiGHS adapter, every call is forwarded to a live Gurobi model
//! as it is made. The environment and model are freed when the adapter drops.

use crate::ENGINE_NAME;
use grb::expr::LinExpr;
use grb::prelude::*;
use mipgate_core::diagnostics::{capture_rss_bytes, rss_delta};
use mipgate_core::{
    ConstrId, Constraint, ConstraintSense, MipSolution, MipSolver, ModelRegistry, Objective,
    ObjectiveSense, SolverConfig, SolverError, SolverStatus, VarId, VarSpec, VarType as MipVarType,
    validate_time_limit,
};
use std::time::Instant;
use tracing::{debug, trace, warn};

fn engine_error(err: grb::Error) -> SolverError {
    SolverError::Engine(err.to_string())
}

fn clamp_infinite(value: f64) -> f64 {
    value.clamp(-grb::INFINITY, grb::INFINITY)
}

fn to_grb_var_type(var_type: MipVarType) -> grb::VarType {
    match var_type {
        MipVarType::Continuous => grb::VarType::Continuous,
        MipVarType::Integer => grb::VarType::Integer,
        MipVarType::Binary => grb::VarType::Binary,
    }
}

/// Run `add` over every item, calling `undo` on the ones already added if a
/// later call fails.
fn add_all_or_undo<I, T, E>(
    items: &[I],
    mut add: impl FnMut(usize, &I) -> Result<T, E>,
    mut undo: impl FnMut(&T),
) -> Result<Vec<T>, E> {
    let mut added = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match add(i, item) {
            Ok(value) => added.push(value),
            Err(err) => {
                added.iter().rev().for_each(&mut undo);
                return Err(err);
            }
        }
    }
    Ok(added)
}

fn to_solver_status(status: Status) -> SolverStatus {
    match status {
        Status::Optimal => SolverStatus::Optimal,
        Status::TimeLimit => SolverStatus::TimeLimit,
        Status::Infeasible => SolverStatus::Infeasible,
        Status::Unbounded => SolverStatus::Unbounded,
        Status::InfOrUnbd => SolverStatus::InfeasibleOrUnbounded,
        _ => SolverStatus::Error,
    }
}

/// MIP adapter backed by Gurobi.
pub struct GurobiSolver {
    registry: ModelRegistry,
    config: SolverConfig,
    model: Model,
    vars: Vec<Var>,
}

impl GurobiSolver {
    pub fn new() -> Result<Self, SolverError> {
        Self::with_config(SolverConfig::default())
    }

    /// Start a Gurobi environment and create an empty model.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::EngineUnavailable`] if the environment cannot be
    /// started, typically because no licence is found.
    pub fn with_config(config: SolverConfig) -> Result<Self, SolverError> {
        config.validate()?;
        let env = Env::empty()
            .and_then(|mut env| {
                env.set(param::OutputFlag, 0)?;
                env.start()
            })
            .map_err(|err| {
                warn!(
                    component = "solver",
                    operation = "init",
                    status = "error",
                    solver = ENGINE_NAME,
                    error = %err,
                    "Failed to start Gurobi environment"
                );
                SolverError::EngineUnavailable(err.to_string())
            })?;
        let model = Model::with_env(config.model_name(), &env).map_err(engine_error)?;

        debug!(
            component = "solver",
            operation = "init",
            status = "success",
            solver = ENGINE_NAME,
            model_name = config.model_name(),
            "Created Gurobi model"
        );

        Ok(Self {
            registry: ModelRegistry::new(),
            config,
            model,
            vars: Vec::new(),
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn linear(&self, terms: &[(VarId, f64)]) -> Result<LinExpr, SolverError> {
        let mut expr = LinExpr::new();
        for (var, coeff) in terms {
            let grb_var = self
                .vars
                .get(var.index())
                .ok_or(SolverError::UnknownVariable(*var))?;
            expr.add_term(*coeff, *grb_var);
        }
        Ok(expr)
    }

    fn apply_config(&mut self) -> Result<(), SolverError> {
        let show_log = self.config.show_log_enabled();
        let log_file = self
            .config
            .log_file
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned());
        let output = show_log || log_file.is_some();
        self.model
            .set_param(param::OutputFlag, i32::from(output))
            .map_err(engine_error)?;
        self.model
            .set_param(param::LogToConsole, i32::from(show_log))
            .map_err(engine_error)?;
        self.model
            .set_param(param::LogFile, log_file.unwrap_or_default())
            .map_err(engine_error)?;
        let limit = self.config.time_limit.map_or(grb::INFINITY, clamp_infinite);
        self.model
            .set_param(param::TimeLimit, limit)
            .map_err(engine_error)?;
        if let Some(gap) = self.config.mip_gap {
            self.model.set_param(param::MIPGap, gap).map_err(engine_error)?;
        }
        if let Some(threads) = self.config.threads {
            let threads = i32::try_from(threads).unwrap_or(i32::MAX);
            self.model
                .set_param(param::Threads, threads)
                .map_err(engine_error)?;
        }
        Ok(())
    }

    fn remove_vars(&mut self, vars: &[Var]) {
        for var in vars {
            if let Err(err) = self.model.remove(*var) {
                warn!(
                    component = "solver",
                    operation = "add_vars",
                    status = "error",
                    solver = ENGINE_NAME,
                    error = %err,
                    "Failed to remove variable after a rejected batch"
                );
            }
        }
    }

    fn extract(
        &self,
        status: SolverStatus,
        solve_time_seconds: f64,
    ) -> Result<MipSolution, SolverError> {
        let sol_count = self.model.get_attr(attr::SolCount).map_err(engine_error)?;
        if !status.may_have_solution() || sol_count <= 0 {
            return Ok(MipSolution::without_assignment(status, solve_time_seconds));
        }
        let values = self
            .model
            .get_obj_attr_batch(attr::X, self.vars.iter().copied())
            .map_err(engine_error)?;
        let offset = self.registry.objective().map_or(0.0, Objective::offset);
        let objective_value = self.model.get_attr(attr::ObjVal).map_err(engine_error)? + offset;
        let mip_gap = if self.registry.has_integer_vars() {
            self.model.get_attr(attr::MIPGap).ok()
        } else {
            None
        };
        Ok(MipSolution {
            status,
            values: Some(values),
            objective_value: Some(objective_value),
            mip_gap,
            solve_time_seconds,
            var_types: Vec::new(),
        })
    }
}

impl MipSolver for GurobiSolver {
    fn engine_name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn add_vars(&mut self, specs: &[VarSpec]) -> Result<Vec<VarId>, SolverError> {
        self.registry.check_var_specs(specs)?;
        let first = self.vars.len();
        let model = &mut self.model;
        let mut rejected = Vec::new();
        let added = add_all_or_undo(
            specs,
            |i, spec| {
                model.add_var(
                    &format!("x{}", first + i),
                    to_grb_var_type(spec.var_type),
                    0.0,
                    clamp_infinite(spec.lower),
                    clamp_infinite(spec.upper),
                    [],
                )
            },
            |var| rejected.push(*var),
        );
        self.remove_vars(&rejected);
        let added = added.map_err(engine_error)?;
        let ids = match self.registry.add_vars(specs) {
            Ok(ids) => ids,
            Err(err) => {
                self.remove_vars(&added);
                return Err(err);
            }
        };
        self.vars.extend(added);
        trace!(
            component = "solver",
            operation = "add_vars",
            status = "success",
            count = ids.len(),
            "Forwarded variables to Gurobi"
        );
        Ok(ids)
    }

    fn add_constr(&mut self, constraint: Constraint) -> Result<ConstrId, SolverError> {
        self.registry.check_constraint(&constraint)?;
        let row = constraint.to_row();
        let lhs = self.linear(&row.terms)?;
        let name = format!("c{}", self.registry.num_constraints());
        let ineq = match constraint.sense() {
            ConstraintSense::LessEqual => c!(lhs <= row.upper),
            ConstraintSense::GreaterEqual => c!(lhs >= row.lower),
            ConstraintSense::Equal => c!(lhs == row.upper),
        };
        self.model.add_constr(&name, ineq).map_err(engine_error)?;
        self.registry.add_constraint(constraint)
    }

    fn set_objective(&mut self, objective: Objective) -> Result<(), SolverError> {
        self.registry.check_objective(&objective)?;
        let normalized = objective.expr().normalized();
        let expr = self.linear(normalized.terms())?;
        let sense = match objective.sense() {
            ObjectiveSense::Minimize => ModelSense::Minimize,
            ObjectiveSense::Maximize => ModelSense::Maximize,
        };
        self.model.set_objective(expr, sense).map_err(engine_error)?;
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
        if self.registry.num_vars() == 0 {
            return Err(SolverError::EmptyModel);
        }
        self.apply_config()?;

        let rss_before = capture_rss_bytes("solve_start");
        let solve_started = Instant::now();
        debug!(
            component = "solver",
            operation = "solve",
            status = "success",
            solver = ENGINE_NAME,
            num_vars = self.registry.num_vars(),
            num_constraints = self.registry.num_constraints(),
            rss_bytes = ?rss_before,
            "Starting solve process"
        );

        self.model.optimize().map_err(engine_error)?;
        let grb_status = self.model.status().map_err(engine_error)?;
        let solve_time_seconds = solve_started.elapsed().as_secs_f64();
        let rss_after = capture_rss_bytes("solve_end");
        let status = to_solver_status(grb_status);

        debug!(
            component = "solver",
            operation = "solve",
            status = "success",
            solver = ENGINE_NAME,
            solver_status = ?grb_status,
            duration_ms = solve_time_seconds * 1000.0,
            rss_bytes = ?rss_after,
            rss_delta_bytes = ?rss_delta(rss_before, rss_after),
            "Gurobi solve completed"
        );
        if status == SolverStatus::Error {
            warn!(
                component = "solver",
                operation = "solve",
                status = "warn",
                solver = ENGINE_NAME,
                solver_status = ?grb_status,
                "Gurobi stopped without a usable result"
            );
        }

        self.extract(status, solve_time_seconds)
            .map(|solution| solution.with_var_types(self.registry.var_types()))
    }

    fn registry(&self) -> &ModelRegistry {
        &self.registry
    }
}

impl Drop for GurobiSolver {
    fn drop(&mut self) {
        debug!(
            component = "solver",
            operation = "free",
            status = "success",
            solver = ENGINE_NAME,
            "Releasing Gurobi model and environment"
        );
    }
}
