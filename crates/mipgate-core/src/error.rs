//! Adapter error types.

use crate::ids::VarId;

/// Error type for adapter operations.
///
/// Solver outcomes such as infeasibility or a reached time limit are not
/// errors; they are reported through [`crate::SolverStatus`].
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Parallel input arrays disagree in length.
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// Variable bounds are NaN, inverted, or otherwise unusable.
    InvalidBounds {
        index: usize,
        lower: f64,
        upper: f64,
    },
    /// Variable type tag not understood.
    InvalidVarType(char),
    /// Constraint sense tag not understood.
    InvalidConstraintSense(char),
    /// Objective direction code not understood.
    InvalidObjectiveSense(i32),
    /// A handle that was never registered with this model.
    UnknownVariable(VarId),
    /// A coefficient or constant is NaN or infinite.
    NonFiniteCoefficient { value: f64 },
    /// Time limit is negative or NaN.
    InvalidTimeLimit(f64),
    /// MIP gap is negative or NaN.
    InvalidMipGap(f64),
    /// Optimize called on a model with no variables.
    EmptyModel,
    /// More variables or constraints than a `u32` handle can address.
    TooManyHandles { what: &'static str, count: usize },
    /// The engine environment could not be created (missing library, licence).
    EngineUnavailable(String),
    /// The engine rejected a call while building or solving the model.
    Engine(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::LengthMismatch { .. } => "INPUT_LENGTH_MISMATCH",
            SolverError::InvalidBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            SolverError::InvalidVarType(_) => "VARIABLE_INVALID_TYPE",
            SolverError::InvalidConstraintSense(_) => "CONSTRAINT_INVALID_SENSE",
            SolverError::InvalidObjectiveSense(_) => "OBJECTIVE_INVALID_SENSE",
            SolverError::UnknownVariable(_) => "VARIABLE_UNKNOWN",
            SolverError::NonFiniteCoefficient { .. } => "EXPR_NON_FINITE",
            SolverError::InvalidTimeLimit(_) => "CONFIG_INVALID_TIME_LIMIT",
            SolverError::InvalidMipGap(_) => "CONFIG_INVALID_MIP_GAP",
            SolverError::EmptyModel => "MODEL_EMPTY",
            SolverError::TooManyHandles { .. } => "MODEL_TOO_MANY_HANDLES",
            SolverError::EngineUnavailable(_) => "ENGINE_UNAVAILABLE",
            SolverError::Engine(_) => "ENGINE_ERROR",
        }
    }

    /// Whether the error comes from caller input rather than the engine.
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            SolverError::EngineUnavailable(_) | SolverError::Engine(_)
        )
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::LengthMismatch {
                what,
                expected,
                got,
            } => write!(
                f,
                "[{}] {} length mismatch (expected {}, got {})",
                self.code(),
                what,
                expected,
                got
            ),
            SolverError::InvalidBounds {
                index,
                lower,
                upper,
            } => write!(
                f,
                "[{}] Variable {} has invalid bounds [{}, {}]",
                self.code(),
                index,
                lower,
                upper
            ),
            SolverError::InvalidVarType(tag) => {
                write!(f, "[{}] Unknown variable type '{}'", self.code(), tag)
            }
            SolverError::InvalidConstraintSense(tag) => {
                write!(f, "[{}] Unknown constraint sense '{}'", self.code(), tag)
            }
            SolverError::InvalidObjectiveSense(code) => write!(
                f,
                "[{}] Unknown objective sense {} (expected 1 or -1)",
                self.code(),
                code
            ),
            SolverError::UnknownVariable(id) => write!(
                f,
                "[{}] Variable handle {} was never registered",
                self.code(),
                id.inner()
            ),
            SolverError::NonFiniteCoefficient { value } => write!(
                f,
                "[{}] Coefficients and constants must be finite (got {})",
                self.code(),
                value
            ),
            SolverError::InvalidTimeLimit(seconds) => write!(
                f,
                "[{}] Time limit must be non-negative (got {})",
                self.code(),
                seconds
            ),
            SolverError::InvalidMipGap(gap) => write!(
                f,
                "[{}] MIP gap must be non-negative (got {})",
                self.code(),
                gap
            ),
            SolverError::EmptyModel => write!(f, "[{}] Model has no variables", self.code()),
            SolverError::TooManyHandles { what, count } => write!(
                f,
                "[{}] Model would hold {} {}, more than a handle can address",
                self.code(),
                count,
                what
            ),
            SolverError::EngineUnavailable(msg) => {
                write!(f, "[{}] Engine not available: {}", self.code(), msg)
            }
            SolverError::Engine(msg) => write!(f, "[{}] Engine error: {}", self.code(), msg),
        }
    }
}

impl std::error::Error for SolverError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_error_code() {
        let err = SolverError::UnknownVariable(VarId::new(42));
        let msg = err.to_string();
        assert!(msg.starts_with("[VARIABLE_UNKNOWN]"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn length_mismatch_names_the_input() {
        let err = SolverError::LengthMismatch {
            what: "upper bounds",
            expected: 3,
            got: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("upper bounds"));
        assert!(msg.contains("expected 3, got 2"));
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SolverError::EmptyModel.code(), "MODEL_EMPTY");
        assert_eq!(SolverError::InvalidVarType('Q').code(), "VARIABLE_INVALID_TYPE");
        assert_eq!(
            SolverError::InvalidObjectiveSense(0).code(),
            "OBJECTIVE_INVALID_SENSE"
        );
        assert_eq!(
            SolverError::EngineUnavailable(String::new()).code(),
            "ENGINE_UNAVAILABLE"
        );
        assert_eq!(SolverError::Engine(String::new()).code(), "ENGINE_ERROR");
    }

    #[test]
    fn too_many_handles_is_an_input_error() {
        let err = SolverError::TooManyHandles {
            what: "variables",
            count: 5_000_000_000,
        };
        assert_eq!(err.code(), "MODEL_TOO_MANY_HANDLES");
        assert!(err.is_input_error());
        let msg = err.to_string();
        assert!(msg.starts_with("[MODEL_TOO_MANY_HANDLES]"));
        assert!(msg.contains("5000000000 variables"));
    }

    #[test]
    fn engine_errors_are_not_input_errors() {
        assert!(SolverError::EmptyModel.is_input_error());
        assert!(SolverError::InvalidTimeLimit(-1.0).is_input_error());
        assert!(!SolverError::Engine("boom".to_string()).is_input_error());
        assert!(!SolverError::EngineUnavailable("licence".to_string()).is_input_error());
    }
}
