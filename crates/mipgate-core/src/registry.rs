//! Adapter-side record of the model handed to an engine.
//!
//! Every backend keeps a [`ModelRegistry`] next to its engine handles. It
//! validates caller input before anything reaches the engine and answers
//! queries (bounds, types, counts) without an engine round-trip.

use crate::error::SolverError;
use crate::expr::{Constraint, Objective};
use crate::ids::{ConstrId, VarId};
use crate::types::{VarSpec, VarType};
use tracing::{debug, trace, warn};

/// Handles for `count` new entries after the first `first`.
///
/// Fails without side effects when the last handle would not fit in a `u32`.
fn handle_range(
    what: &'static str,
    first: usize,
    count: usize,
) -> Result<std::ops::Range<u32>, SolverError> {
    let overflow = || SolverError::TooManyHandles {
        what,
        count: first.saturating_add(count),
    };
    let end = first
        .checked_add(count)
        .and_then(|end| u32::try_from(end).ok())
        .ok_or_else(overflow)?;
    let start = u32::try_from(first).map_err(|_| overflow())?;
    Ok(start..end)
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    variables: Vec<VarSpec>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Validation ──────────────────────────────────────────

    /// Check a batch of variable specs without registering them.
    pub fn check_var_specs(&self, specs: &[VarSpec]) -> Result<(), SolverError> {
        let offset = self.variables.len();
        for (i, spec) in specs.iter().enumerate() {
            spec.validate(offset + i).inspect_err(|err| {
                warn!(
                    component = "model",
                    operation = "add_vars",
                    status = "error",
                    index = offset + i,
                    lower = spec.lower,
                    upper = spec.upper,
                    var_type = spec.var_type.as_str(),
                    code = err.code(),
                    "Rejected variable"
                );
            })?;
        }
        Ok(())
    }

    /// Check that a handle was registered with this model.
    pub fn check_var(&self, var: VarId) -> Result<(), SolverError> {
        if var.index() < self.variables.len() {
            Ok(())
        } else {
            warn!(
                component = "model",
                operation = "check_var",
                status = "error",
                var = var.inner(),
                num_vars = self.variables.len(),
                "Unknown variable handle"
            );
            Err(SolverError::UnknownVariable(var))
        }
    }

    pub fn check_constraint(&self, constraint: &Constraint) -> Result<(), SolverError> {
        for var in constraint.variables() {
            self.check_var(var)?;
        }
        constraint.check_finite()
    }

    pub fn check_objective(&self, objective: &Objective) -> Result<(), SolverError> {
        for var in objective.expr().variables() {
            self.check_var(var)?;
        }
        objective.expr().check_finite()
    }

    // ── Mutation ────────────────────────────────────────────

    /// Register a batch of variables. Nothing is registered if any spec is
    /// invalid.
    pub fn add_vars(&mut self, specs: &[VarSpec]) -> Result<Vec<VarId>, SolverError> {
        self.check_var_specs(specs)?;
        let ids = handle_range("variables", self.variables.len(), specs.len())?
            .map(VarId::new)
            .collect();
        self.variables.extend_from_slice(specs);
        debug!(
            component = "model",
            operation = "add_vars",
            status = "success",
            added = specs.len(),
            num_vars = self.variables.len(),
            "Registered variables"
        );
        Ok(ids)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstrId, SolverError> {
        self.check_constraint(&constraint)?;
        let id = ConstrId::new(handle_range("constraints", self.constraints.len(), 1)?.start);
        trace!(
            component = "model",
            operation = "add_constr",
            status = "success",
            constr = id.inner(),
            sense = constraint.sense().as_str(),
            lhs_terms = constraint.lhs().terms().len(),
            rhs_terms = constraint.rhs().terms().len(),
            "Registered constraint"
        );
        self.constraints.push(constraint);
        Ok(id)
    }

    /// Replace the objective, returning the previous one.
    pub fn set_objective(&mut self, objective: Objective) -> Result<Option<Objective>, SolverError> {
        self.check_objective(&objective)?;
        debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            sense = ?objective.sense(),
            terms = objective.expr().terms().len(),
            replaced = self.objective.is_some(),
            "Set objective"
        );
        Ok(self.objective.replace(objective))
    }

    // ── Queries ─────────────────────────────────────────────

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variable(&self, var: VarId) -> Option<&VarSpec> {
        self.variables.get(var.index())
    }

    pub fn bounds(&self, var: VarId) -> Option<(f64, f64)> {
        self.variable(var).map(|spec| (spec.lower, spec.upper))
    }

    pub fn var_type(&self, var: VarId) -> Option<VarType> {
        self.variable(var).map(|spec| spec.var_type)
    }

    pub fn variables(&self) -> &[VarSpec] {
        &self.variables
    }

    pub fn constraint(&self, id: ConstrId) -> Option<&Constraint> {
        self.constraints.get(id.index())
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Domain of every registered variable, indexed by handle.
    pub fn var_types(&self) -> Vec<VarType> {
        self.variables.iter().map(|spec| spec.var_type).collect()
    }

    pub fn has_integer_vars(&self) -> bool {
        self.variables.iter().any(|spec| spec.var_type.is_integral())
    }

    /// Check an assignment against bounds, integrality and constraints.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.variables.len() {
            return false;
        }
        let within_domain = self.variables.iter().zip(values).all(|(spec, &value)| {
            value >= spec.lower - tolerance
                && value <= spec.upper + tolerance
                && (!spec.var_type.is_integral() || (value - value.round()).abs() <= tolerance)
        });
        within_domain
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied_by(values, tolerance).unwrap_or(false))
    }
}
