use crate::error::SolverError;
use serde::{Deserialize, Serialize};

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarType {
    Continuous,
    Integer,
    Binary,
}

impl VarType {
    /// Single-character tag used by flat array inputs.
    pub fn tag(self) -> char {
        match self {
            VarType::Continuous => 'C',
            VarType::Integer => 'I',
            VarType::Binary => 'B',
        }
    }

    /// Parse a single-character tag.
    pub fn from_tag(tag: char) -> Result<Self, SolverError> {
        match tag {
            'C' => Ok(VarType::Continuous),
            'I' => Ok(VarType::Integer),
            'B' => Ok(VarType::Binary),
            other => Err(SolverError::InvalidVarType(other)),
        }
    }

    pub fn is_integral(self) -> bool {
        !matches!(self, VarType::Continuous)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VarType::Continuous => "continuous",
            VarType::Integer => "integer",
            VarType::Binary => "binary",
        }
    }
}

/// Bounds and domain of one variable to be registered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarSpec {
    pub lower: f64,
    pub upper: f64,
    pub var_type: VarType,
}

impl VarSpec {
    pub fn new(lower: f64, upper: f64, var_type: VarType) -> Self {
        Self {
            lower,
            upper,
            var_type,
        }
    }

    /// Binary variable with bounds [0, 1].
    pub fn binary() -> Self {
        Self::new(0.0, 1.0, VarType::Binary)
    }

    pub fn integer(lower: f64, upper: f64) -> Self {
        Self::new(lower, upper, VarType::Integer)
    }

    pub fn continuous(lower: f64, upper: f64) -> Self {
        Self::new(lower, upper, VarType::Continuous)
    }

    /// Zip parallel bound and type arrays into specs.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::LengthMismatch`] if any array length differs
    /// from `count`, or [`SolverError::InvalidVarType`] for an unknown tag.
    pub fn from_arrays(
        count: usize,
        lower: &[f64],
        upper: &[f64],
        types: &[char],
    ) -> Result<Vec<Self>, SolverError> {
        for (what, len) in [
            ("lower bounds", lower.len()),
            ("upper bounds", upper.len()),
            ("variable types", types.len()),
        ] {
            if len != count {
                return Err(SolverError::LengthMismatch {
                    what,
                    expected: count,
                    got: len,
                });
            }
        }

        lower
            .iter()
            .zip(upper)
            .zip(types)
            .map(|((&lb, &ub), &tag)| Ok(Self::new(lb, ub, VarType::from_tag(tag)?)))
            .collect()
    }

    /// Check the bounds against the variable domain.
    ///
    /// `index` is only used to label the error.
    pub fn validate(&self, index: usize) -> Result<(), SolverError> {
        let invalid = || SolverError::InvalidBounds {
            index,
            lower: self.lower,
            upper: self.upper,
        };
        if self.lower.is_nan()
            || self.upper.is_nan()
            || self.lower > self.upper
            || self.lower == f64::INFINITY
            || self.upper == f64::NEG_INFINITY
        {
            return Err(invalid());
        }
        if self.var_type == VarType::Binary && (self.lower < 0.0 || self.upper > 1.0) {
            return Err(invalid());
        }
        Ok(())
    }
}

/// Relational operator between the two sides of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSense {
    LessEqual,
    Equal,
    GreaterEqual,
}

impl ConstraintSense {
    pub fn tag(self) -> char {
        match self {
            ConstraintSense::LessEqual => '<',
            ConstraintSense::Equal => '=',
            ConstraintSense::GreaterEqual => '>',
        }
    }

    pub fn from_tag(tag: char) -> Result<Self, SolverError> {
        match tag {
            '<' => Ok(ConstraintSense::LessEqual),
            '=' => Ok(ConstraintSense::Equal),
            '>' => Ok(ConstraintSense::GreaterEqual),
            other => Err(SolverError::InvalidConstraintSense(other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintSense::LessEqual => "le",
            ConstraintSense::Equal => "eq",
            ConstraintSense::GreaterEqual => "ge",
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    /// Integer code: `1` minimizes, `-1` maximizes.
    pub fn code(self) -> i32 {
        match self {
            ObjectiveSense::Minimize => 1,
            ObjectiveSense::Maximize => -1,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, SolverError> {
        match code {
            1 => Ok(ObjectiveSense::Minimize),
            -1 => Ok(ObjectiveSense::Maximize),
            other => Err(SolverError::InvalidObjectiveSense(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_type_tags_roundtrip() {
        for var_type in [VarType::Continuous, VarType::Integer, VarType::Binary] {
            assert_eq!(VarType::from_tag(var_type.tag()), Ok(var_type));
        }
        assert_eq!(VarType::from_tag('S'), Err(SolverError::InvalidVarType('S')));
    }

    #[test]
    fn from_arrays_checks_every_length() {
        let err = VarSpec::from_arrays(2, &[0.0, 0.0], &[1.0], &['C', 'C']).unwrap_err();
        assert_eq!(
            err,
            SolverError::LengthMismatch {
                what: "upper bounds",
                expected: 2,
                got: 1,
            }
        );

        let err = VarSpec::from_arrays(2, &[0.0, 0.0], &[1.0, 1.0], &['C']).unwrap_err();
        assert!(matches!(
            err,
            SolverError::LengthMismatch {
                what: "variable types",
                ..
            }
        ));
    }

    #[test]
    fn from_arrays_zips_in_order() {
        let specs = VarSpec::from_arrays(3, &[0.0, -1.0, 0.0], &[1.0, 4.0, 9.5], &['B', 'I', 'C'])
            .unwrap();
        assert_eq!(
            specs,
            vec![
                VarSpec::binary(),
                VarSpec::integer(-1.0, 4.0),
                VarSpec::continuous(0.0, 9.5),
            ]
        );
    }

    #[test]
    fn validate_rejects_unusable_bounds() {
        assert!(VarSpec::continuous(2.0, 1.0).validate(0).is_err());
        assert!(VarSpec::continuous(f64::NAN, 1.0).validate(0).is_err());
        assert!(VarSpec::continuous(f64::INFINITY, f64::INFINITY).validate(0).is_err());
        assert!(VarSpec::continuous(f64::NEG_INFINITY, f64::NEG_INFINITY).validate(0).is_err());
        assert!(VarSpec::new(0.0, 2.0, VarType::Binary).validate(0).is_err());
        assert!(VarSpec::new(-1.0, 1.0, VarType::Binary).validate(0).is_err());

        assert!(VarSpec::continuous(f64::NEG_INFINITY, f64::INFINITY).validate(0).is_ok());
        assert!(VarSpec::integer(3.0, 3.0).validate(0).is_ok());
        assert!(VarSpec::new(1.0, 1.0, VarType::Binary).validate(0).is_ok());
    }

    #[test]
    fn objective_sense_codes() {
        assert_eq!(ObjectiveSense::from_code(1), Ok(ObjectiveSense::Minimize));
        assert_eq!(ObjectiveSense::from_code(-1), Ok(ObjectiveSense::Maximize));
        assert_eq!(
            ObjectiveSense::from_code(0),
            Err(SolverError::InvalidObjectiveSense(0))
        );
        assert_eq!(ObjectiveSense::Maximize.code(), -1);
    }

    #[test]
    fn constraint_sense_tags() {
        assert_eq!(ConstraintSense::from_tag('<'), Ok(ConstraintSense::LessEqual));
        assert_eq!(ConstraintSense::from_tag('='), Ok(ConstraintSense::Equal));
        assert_eq!(ConstraintSense::from_tag('>'), Ok(ConstraintSense::GreaterEqual));
        assert!(ConstraintSense::from_tag('!').is_err());
    }
}
