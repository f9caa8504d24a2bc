//! Backend trait for MIP engines.

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::expr::{Constraint, Objective};
use crate::ids::{ConstrId, VarId};
use crate::registry::ModelRegistry;
use crate::solution::MipSolution;
use crate::types::VarSpec;

/// Interface every engine backend implements.
///
/// A backend owns its engine resources exclusively and releases them when
/// dropped. `optimize` blocks until the engine returns.
pub trait MipSolver {
    /// Short engine name used in logs and reports.
    fn engine_name(&self) -> &'static str;

    /// Register variables and return their handles in input order.
    ///
    /// # Errors
    ///
    /// Returns an error and registers nothing if any spec has invalid bounds.
    fn add_vars(&mut self, specs: &[VarSpec]) -> Result<Vec<VarId>, SolverError>;

    /// Add one constraint.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::UnknownVariable`] if the constraint references a
    /// handle that was never registered.
    fn add_constr(&mut self, constraint: Constraint) -> Result<ConstrId, SolverError>;

    /// Set the objective, replacing any previous one.
    fn set_objective(&mut self, objective: Objective) -> Result<(), SolverError>;

    /// Show or hide engine progress output.
    fn show_log(&mut self, show: bool);

    /// Bound the wall-clock time of the next solve.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidTimeLimit`] for negative or NaN values.
    fn set_time_limit(&mut self, seconds: f64) -> Result<(), SolverError>;

    /// Current time limit in seconds, `None` if unlimited.
    fn time_limit(&self) -> Option<f64>;

    /// Apply a full configuration.
    fn configure(&mut self, config: SolverConfig) -> Result<(), SolverError>;

    /// Solve the model and translate the outcome.
    fn optimize(&mut self) -> Result<MipSolution, SolverError>;

    /// The model as recorded by the adapter.
    fn registry(&self) -> &ModelRegistry;

    /// Register variables from parallel bound and type-tag arrays.
    fn add_vars_from_arrays(
        &mut self,
        count: usize,
        lower: &[f64],
        upper: &[f64],
        types: &[char],
    ) -> Result<Vec<VarId>, SolverError> {
        let specs = VarSpec::from_arrays(count, lower, upper, types)?;
        self.add_vars(&specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validate_time_limit;
    use crate::status::SolverStatus;

    /// Records calls without an engine behind it.
    #[derive(Default)]
    struct RecordingSolver {
        registry: ModelRegistry,
        config: SolverConfig,
    }

    impl MipSolver for RecordingSolver {
        fn engine_name(&self) -> &'static str {
            "recording"
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
            self.config.time_limit
        }

        fn configure(&mut self, config: SolverConfig) -> Result<(), SolverError> {
            config.validate()?;
            self.config = config;
            Ok(())
        }

        fn optimize(&mut self) -> Result<MipSolution, SolverError> {
            Ok(MipSolution::without_assignment(SolverStatus::Error, 0.0))
        }

        fn registry(&self) -> &ModelRegistry {
            &self.registry
        }
    }

    #[test]
    fn add_vars_from_arrays_goes_through_add_vars() {
        let mut solver = RecordingSolver::default();
        let ids = solver
            .add_vars_from_arrays(2, &[0.0, 0.0], &[1.0, 10.0], &['B', 'I'])
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(solver.registry().num_vars(), 2);
    }

    #[test]
    fn add_vars_from_arrays_rejects_bad_tag() {
        let mut solver = RecordingSolver::default();
        let err = solver
            .add_vars_from_arrays(1, &[0.0], &[1.0], &['X'])
            .unwrap_err();
        assert_eq!(err, SolverError::InvalidVarType('X'));
        assert_eq!(solver.registry().num_vars(), 0);
    }

    #[test]
    fn time_limit_roundtrip() {
        let mut solver = RecordingSolver::default();
        assert_eq!(solver.time_limit(), None);
        solver.set_time_limit(2.5).unwrap();
        assert_eq!(solver.time_limit(), Some(2.5));
        assert!(solver.set_time_limit(-1.0).is_err());
        assert_eq!(solver.time_limit(), Some(2.5));
    }
}
