//! Errors raised when building soft-operator configurations.
//!
//! The operators themselves never fail: an invalid configuration that
//! bypasses the validated constructors produces NaN/Inf in the output.

/// Result alias for soft-operator configuration.
pub type SoftOpsResult<T> = Result<T, SoftOpsError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SoftOpsError {
    /// Softness must be finite and strictly positive.
    InvalidSoftness { value: f64, reason: &'static str },

    /// Output levels must be finite.
    InvalidLevel { name: &'static str, value: f64 },
}

impl std::error::Error for SoftOpsError {}

impl std::fmt::Display for SoftOpsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoftOpsError::InvalidSoftness { value, reason } => {
                write!(f, "Invalid softness {value}: {reason}")
            }
            SoftOpsError::InvalidLevel { name, value } => {
                write!(f, "Invalid output level {name} = {value}, must be finite")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<SoftOpsError> for pyo3::PyErr {
    fn from(err: SoftOpsError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
