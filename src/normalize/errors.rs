//! Errors raised when configuring the scale normalizers.

/// Result alias for normalizer configuration.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// eps must be finite and strictly positive.
    InvalidEps { value: f64, reason: &'static str },

    /// Scale name not recognized.
    UnknownScale { name: String, reason: &'static str },
}

impl std::error::Error for NormalizeError {}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::InvalidEps { value, reason } => {
                write!(f, "Invalid eps {value}: {reason}")
            }
            NormalizeError::UnknownScale { name, reason } => {
                write!(f, "Unknown scale '{name}': {reason}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<NormalizeError> for pyo3::PyErr {
    fn from(err: NormalizeError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
