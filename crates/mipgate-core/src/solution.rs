//! Solution record returned by `optimize`.

use crate::ids::VarId;
use crate::status::SolverStatus;
use crate::types::VarType;
use serde::{Deserialize, Serialize};

/// Values above this count as "one" for integer and binary variables.
pub const ONE_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MipSolution {
    pub status: SolverStatus,
    /// Values indexed by variable handle; `None` when no feasible assignment exists.
    pub values: Option<Vec<f64>>,
    /// Objective value including the constant offset.
    pub objective_value: Option<f64>,
    /// Relative MIP gap reported by the engine, if any.
    pub mip_gap: Option<f64>,
    pub solve_time_seconds: f64,
    /// Domain of each variable, indexed by handle.
    #[serde(default)]
    pub var_types: Vec<VarType>,
}

impl MipSolution {
    /// Record for an outcome without an assignment.
    pub fn without_assignment(status: SolverStatus, solve_time_seconds: f64) -> Self {
        Self {
            status,
            values: None,
            objective_value: None,
            mip_gap: None,
            solve_time_seconds,
            var_types: Vec::new(),
        }
    }

    /// Attach the variable domains recorded for the solved model.
    pub fn with_var_types(mut self, var_types: Vec<VarType>) -> Self {
        self.var_types = var_types;
        self
    }

    pub fn has_assignment(&self) -> bool {
        self.values.is_some()
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.as_ref()?.get(var.index()).copied()
    }

    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    pub fn var_type(&self, var: VarId) -> Option<VarType> {
        self.var_types.get(var.index()).copied()
    }

    /// Whether an integer or binary variable is set to one. Continuous
    /// variables and handles without a recorded domain are never one.
    pub fn is_one(&self, var: VarId) -> bool {
        self.var_type(var).is_some_and(VarType::is_integral)
            && self.value(var).is_some_and(|value| value > ONE_THRESHOLD)
    }
}
