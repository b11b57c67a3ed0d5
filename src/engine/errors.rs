//! Errors raised while constructing host expressions.
//!
//! Arithmetic on expressions never returns an error: numeric faults travel
//! as NaN/Inf and broadcast failures panic inside ndarray. Only explicit
//! constructors that accept two arrays which must agree in shape report
//! [`EngineError`].

/// Result alias for expression construction.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A tangent must have exactly the shape of the value it seeds.
    TangentShapeMismatch { value: Vec<usize>, tangent: Vec<usize> },
}

impl std::error::Error for EngineError {}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::TangentShapeMismatch { value, tangent } => {
                write!(f, "Tangent shape {tangent:?} does not match value shape {value:?}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<EngineError> for pyo3::PyErr {
    fn from(err: EngineError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
