use argmin::core::{ArgminError, Error};

use crate::softops::errors::SoftOpsError;

/// Result alias for level calibration.
pub type CalibResult<T> = Result<T, CalibError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CalibError {
    // ---- Data ----
    /// Prices and labels must be non-empty.
    EmptyInput,

    /// Prices and labels must have the same length.
    LengthMismatch { prices: usize, labels: usize },

    /// Prices need to be finite (and positive in percent mode).
    InvalidPrice { index: usize, value: f64, reason: &'static str },

    /// Labels must be exactly 0 or 1.
    InvalidLabel { index: usize, value: f64 },

    // ---- Options ----
    /// Step size needs to be positive and finite.
    InvalidStepSize { value: f64, reason: &'static str },

    /// Maximum iterations needs to be positive.
    InvalidMaxIter { max_iter: u64, reason: &'static str },

    /// Softness of the comparison needs to be positive and finite.
    InvalidSoftness { value: f64, reason: &'static str },

    /// The comparison must map onto the label set {0, 1}.
    InvalidLevels { ym: f64, yp: f64 },

    /// A single comparison output level is not finite.
    InvalidOutputLevel { name: &'static str, value: f64 },

    // ---- Parameter ----
    /// The level parameter vector has exactly one entry.
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// Level needs to be finite (and positive in percent mode).
    InvalidLevel { value: f64, reason: &'static str },

    /// The solver finished without a parameter.
    MissingLevel,

    // ---- Cost / gradient ----
    /// Cost function returned a non-finite value.
    NonFiniteCost { value: f64 },

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient elements need to be finite.
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    BackendError { text: String },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for CalibError {}

impl std::fmt::Display for CalibError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Data ----
            CalibError::EmptyInput => {
                write!(f, "Prices and labels must be non-empty")
            }
            CalibError::LengthMismatch { prices, labels } => {
                write!(f, "Length mismatch: {prices} prices, {labels} labels")
            }
            CalibError::InvalidPrice { index, value, reason } => {
                write!(f, "Invalid price at index {index}: {value}: {reason}")
            }
            CalibError::InvalidLabel { index, value } => {
                write!(f, "Invalid label at index {index}: {value}, must be 0 or 1")
            }

            // ---- Options ----
            CalibError::InvalidStepSize { value, reason } => {
                write!(f, "Invalid step size {value}: {reason}")
            }
            CalibError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            CalibError::InvalidSoftness { value, reason } => {
                write!(f, "Invalid softness {value}: {reason}")
            }
            CalibError::InvalidLevels { ym, yp } => {
                write!(f, "Invalid output levels ({ym}, {yp}): must be (0, 1) or (1, 0)")
            }
            CalibError::InvalidOutputLevel { name, value } => {
                write!(f, "Invalid output level {name} = {value}, must be finite")
            }

            // ---- Parameter ----
            CalibError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            CalibError::InvalidLevel { value, reason } => {
                write!(f, "Invalid level {value}: {reason}")
            }
            CalibError::MissingLevel => {
                write!(f, "Missing calibrated level")
            }

            // ---- Cost / gradient ----
            CalibError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            CalibError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            CalibError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- Argmin ----
            CalibError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            CalibError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            CalibError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            CalibError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            CalibError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            CalibError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            CalibError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            CalibError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            CalibError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for CalibError {
    fn from(original_err: Error) -> Self {
        // Errors raised by the cost/gradient travel through argmin boxed.
        let original_err = match original_err.downcast::<CalibError>() {
            Ok(calib_err) => return calib_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => CalibError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => CalibError::NotImplemented { text },
                ArgminError::NotInitialized { text } => CalibError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => CalibError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => {
                    CalibError::CheckPointNotFound { text }
                }
                ArgminError::PotentialBug { text } => CalibError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => CalibError::ImpossibleError { text },
                _ => CalibError::UnknownError,
            },
            Err(err) => CalibError::BackendError { text: err.to_string() },
        }
    }
}

impl From<SoftOpsError> for CalibError {
    fn from(err: SoftOpsError) -> Self {
        match err {
            SoftOpsError::InvalidSoftness { value, reason } => {
                CalibError::InvalidSoftness { value, reason }
            }
            SoftOpsError::InvalidLevel { name, value } => {
                CalibError::InvalidOutputLevel { name, value }
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<CalibError> for pyo3::PyErr {
    fn from(err: CalibError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
