use core::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvableError {
    #[error("Shape mismatch in {type_name}: expected {expected} field elements but got {actual}")]
    ShapeMismatch {
        type_name: String,
        expected: usize,
        actual: usize,
    },
    #[error("{type_name} does not provide a {capability} codec")]
    MissingCapability {
        type_name: String,
        capability: &'static str,
    },
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
    #[error("Context frame {left} left while frame {top:?} is the innermost frame")]
    ContextImbalance { left: u64, top: Option<u64> },
    #[error("Constraint cannot be expressed by the engine: {0}")]
    UnsupportedConstraint(String),
    #[error("Value of variable {0} is not available outside the prover")]
    MissingValue(usize),
    #[error("Checked computation has no circuit engine installed")]
    NoActiveEngine,
    #[error("Blinding values are only available inside a memoization pass")]
    NoMemoScope,
    #[error("Memoized witness #{index} was recorded for a different type than {type_name}")]
    MemoDesync { index: usize, type_name: String },
    #[error("Invalid JSON for {type_name}: {reason}")]
    InvalidJson { type_name: String, reason: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ProvableError {
    pub(crate) fn shape(type_name: impl Into<String>, expected: usize, actual: usize) -> Self {
        ProvableError::ShapeMismatch {
            type_name: type_name.into(),
            expected,
            actual,
        }
    }

    pub(crate) fn invalid_json(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ProvableError::InvalidJson {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}
