//! Linear expressions, constraints and objectives.
//!
//! A constraint keeps both of its sides as given by the caller. Backends call
//! [`Constraint::to_row`] to lower it to the single-row form engines expect:
//! normalized terms of `lhs - rhs` with bounds taken from the combined
//! constant.

use crate::error::SolverError;
use crate::ids::VarId;
use crate::types::{ConstraintSense, ObjectiveSense};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    // ── Constructors ────────────────────────────────────────

    pub fn new(terms: Vec<(VarId, f64)>, constant: f64) -> Self {
        Self { terms, constant }
    }

    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            ..Default::default()
        }
    }

    /// Single term: coeff * var.
    pub fn term(var: VarId, coeff: f64) -> Self {
        Self {
            terms: vec![(var, coeff)],
            constant: 0.0,
        }
    }

    /// Single variable with coefficient 1.0.
    pub fn var(var: VarId) -> Self {
        Self::term(var, 1.0)
    }

    /// Sum of variables, each with coefficient 1.0.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|var| (var, 1.0)).collect(),
            constant: 0.0,
        }
    }

    /// Build from parallel coefficient and handle arrays.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::LengthMismatch`] if the arrays differ in length.
    pub fn from_arrays(coeffs: &[f64], vars: &[VarId], constant: f64) -> Result<Self, SolverError> {
        if coeffs.len() != vars.len() {
            return Err(SolverError::LengthMismatch {
                what: "expression variables",
                expected: coeffs.len(),
                got: vars.len(),
            });
        }
        Ok(Self {
            terms: vars.iter().copied().zip(coeffs.iter().copied()).collect(),
            constant,
        })
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.terms.iter().map(|(var, _)| *var)
    }

    pub fn coefficients(&self) -> impl Iterator<Item = f64> + '_ {
        self.terms.iter().map(|(_, coeff)| *coeff)
    }

    pub fn into_parts(self) -> (Vec<(VarId, f64)>, f64) {
        (self.terms, self.constant)
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    // ── Operations ──────────────────────────────────────────

    pub fn add_term(mut self, var: VarId, coeff: f64) -> Self {
        self.terms.push((var, coeff));
        self
    }

    pub fn add_constant(mut self, constant: f64) -> Self {
        self.constant += constant;
        self
    }

    pub fn plus(mut self, other: &LinearExpr) -> Self {
        self.terms.extend_from_slice(&other.terms);
        self.constant += other.constant;
        self
    }

    pub fn minus(self, other: &LinearExpr) -> Self {
        self.plus(&other.scale(-1.0))
    }

    pub fn scale(&self, by: f64) -> Self {
        Self {
            terms: self.terms.iter().map(|(v, c)| (*v, *c * by)).collect(),
            constant: self.constant * by,
        }
    }

    /// Merge duplicate handles and drop zero coefficients, ordered by handle.
    pub fn normalized(&self) -> Self {
        let mut merged: BTreeMap<VarId, f64> = BTreeMap::new();
        for (var, coeff) in &self.terms {
            *merged.entry(*var).or_insert(0.0) += *coeff;
        }
        Self {
            terms: merged.into_iter().filter(|(_, c)| *c != 0.0).collect(),
            constant: self.constant,
        }
    }

    /// Evaluate against a dense assignment indexed by handle.
    ///
    /// Returns `None` if a handle has no value.
    pub fn evaluate(&self, values: &[f64]) -> Option<f64> {
        self.terms
            .iter()
            .try_fold(self.constant, |acc, (var, coeff)| {
                values.get(var.index()).map(|value| acc + coeff * value)
            })
    }

    /// Check every coefficient and the constant are finite.
    pub fn check_finite(&self) -> Result<(), SolverError> {
        std::iter::once(self.constant)
            .chain(self.coefficients())
            .find(|value| !value.is_finite())
            .map_or(Ok(()), |value| {
                Err(SolverError::NonFiniteCoefficient { value })
            })
    }
}

/// Constraint lowered to one engine row: `lower <= sum(coeff * var) <= upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub terms: Vec<(VarId, f64)>,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    lhs: LinearExpr,
    sense: ConstraintSense,
    rhs: LinearExpr,
}

impl Constraint {
    pub fn new(lhs: LinearExpr, sense: ConstraintSense, rhs: LinearExpr) -> Self {
        Self { lhs, sense, rhs }
    }

    pub fn less_equal(lhs: LinearExpr, rhs: LinearExpr) -> Self {
        Self::new(lhs, ConstraintSense::LessEqual, rhs)
    }

    pub fn equal(lhs: LinearExpr, rhs: LinearExpr) -> Self {
        Self::new(lhs, ConstraintSense::Equal, rhs)
    }

    pub fn greater_equal(lhs: LinearExpr, rhs: LinearExpr) -> Self {
        Self::new(lhs, ConstraintSense::GreaterEqual, rhs)
    }

    /// Build from the flat array form: both sides as coefficients, handles and
    /// a constant, joined by a sense tag (`'<'`, `'='`, `'>'`).
    #[allow(clippy::too_many_arguments)]
    pub fn from_arrays(
        lhs_coeffs: &[f64],
        lhs_vars: &[VarId],
        lhs_constant: f64,
        rhs_coeffs: &[f64],
        rhs_vars: &[VarId],
        rhs_constant: f64,
        sense: char,
    ) -> Result<Self, SolverError> {
        Ok(Self {
            lhs: LinearExpr::from_arrays(lhs_coeffs, lhs_vars, lhs_constant)?,
            sense: ConstraintSense::from_tag(sense)?,
            rhs: LinearExpr::from_arrays(rhs_coeffs, rhs_vars, rhs_constant)?,
        })
    }

    pub fn lhs(&self) -> &LinearExpr {
        &self.lhs
    }

    pub fn rhs(&self) -> &LinearExpr {
        &self.rhs
    }

    pub fn sense(&self) -> ConstraintSense {
        self.sense
    }

    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        self.lhs.variables().chain(self.rhs.variables())
    }

    /// Lower `lhs sense rhs` to `terms(lhs - rhs) sense -(lhs.c - rhs.c)`.
    pub fn to_row(&self) -> Row {
        let combined = self.lhs.clone().minus(&self.rhs).normalized();
        let bound = -combined.constant();
        let (lower, upper) = match self.sense {
            ConstraintSense::LessEqual => (f64::NEG_INFINITY, bound),
            ConstraintSense::GreaterEqual => (bound, f64::INFINITY),
            ConstraintSense::Equal => (bound, bound),
        };
        Row {
            terms: combined.into_parts().0,
            lower,
            upper,
        }
    }

    /// Check both sides and the lowered row hold only finite numbers.
    ///
    /// Finite sides can still combine to an infinite bound or a merged
    /// coefficient that overflows.
    pub fn check_finite(&self) -> Result<(), SolverError> {
        self.lhs.check_finite()?;
        self.rhs.check_finite()?;
        let row = self.to_row();
        let bound = match self.sense {
            ConstraintSense::GreaterEqual => row.lower,
            ConstraintSense::LessEqual | ConstraintSense::Equal => row.upper,
        };
        std::iter::once(bound)
            .chain(row.terms.iter().map(|(_, coeff)| *coeff))
            .find(|value| !value.is_finite())
            .map_or(Ok(()), |value| {
                Err(SolverError::NonFiniteCoefficient { value })
            })
    }

    /// Whether the assignment satisfies the constraint within `tolerance`.
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> Option<bool> {
        let lhs = self.lhs.evaluate(values)?;
        let rhs = self.rhs.evaluate(values)?;
        Some(match self.sense {
            ConstraintSense::LessEqual => lhs <= rhs + tolerance,
            ConstraintSense::GreaterEqual => lhs + tolerance >= rhs,
            ConstraintSense::Equal => (lhs - rhs).abs() <= tolerance,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Objective {
    expr: LinearExpr,
    sense: ObjectiveSense,
}

impl Objective {
    pub fn new(expr: LinearExpr, sense: ObjectiveSense) -> Self {
        Self { expr, sense }
    }

    pub fn minimize(expr: LinearExpr) -> Self {
        Self::new(expr, ObjectiveSense::Minimize)
    }

    pub fn maximize(expr: LinearExpr) -> Self {
        Self::new(expr, ObjectiveSense::Maximize)
    }

    /// Build from the flat array form with an integer direction code
    /// (`1` minimize, `-1` maximize).
    pub fn from_arrays(
        coeffs: &[f64],
        vars: &[VarId],
        constant: f64,
        sense: i32,
    ) -> Result<Self, SolverError> {
        Ok(Self {
            expr: LinearExpr::from_arrays(coeffs, vars, constant)?,
            sense: ObjectiveSense::from_code(sense)?,
        })
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn offset(&self) -> f64 {
        self.expr.constant()
    }
}
