//! Python-boundary helpers shared by the `#[pyfunction]`s in `lib.rs`.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, ArrayD, arr0};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray, // ArrayD → PyArrayDyn
    PyArrayDyn,
    PyReadonlyArrayDyn,
};

#[cfg(feature = "python-bindings")]
use crate::{
    engine::Dual,
    softops::{
        compare::CompareOptions,
        threshold::{Sigmoid, TanhStep, ThresholdOptions},
    },
};

/// A Python `(value, gradient)` pair of float64 arrays.
#[cfg(feature = "python-bindings")]
pub type PyPair<'py> = (Bound<'py, PyArrayDyn<f64>>, Bound<'py, PyArrayDyn<f64>>);

/// Convert an array-like (numpy array of any rank, pandas Series, nested
/// sequence or bare float) into an owned `ArrayD<f64>`.
#[cfg(feature = "python-bindings")]
pub fn extract_values<'py>(raw_data: &Bound<'py, PyAny>) -> PyResult<ArrayD<f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArrayDyn<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArrayDyn<f64>>() {
            return Ok(series_ro.as_array().to_owned());
        }
    }

    if let Ok(value) = raw_data.extract::<f64>() {
        return Ok(arr0(value).into_dyn());
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a float, numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(Array1::from(vec).into_dyn())
}

/// Same as [`extract_values`], requiring a one-dimensional result.
#[cfg(feature = "python-bindings")]
pub fn extract_vector<'py>(raw_data: &Bound<'py, PyAny>, name: &str) -> PyResult<Array1<f64>> {
    extract_values(raw_data)?
        .into_dimensionality()
        .map_err(|_| PyValueError::new_err(format!("{name} must be one-dimensional")))
}

/// Hand a recorded expression back to Python as `(value, gradient)`.
#[cfg(feature = "python-bindings")]
pub fn dual_to_py<'py>(py: Python<'py>, dual: Dual) -> PyPair<'py> {
    let (value, tangent) = dual.into_parts();
    (value.into_pyarray(py), tangent.into_pyarray(py))
}

/// Validated threshold configuration from keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn build_threshold_opts(
    ym: f64, yp: f64, softness: f64, soft_value: bool, soft_grad: bool,
) -> PyResult<ThresholdOptions<Sigmoid>> {
    Ok(ThresholdOptions::new(ym, yp, softness, soft_value, soft_grad)?)
}

/// Validated comparison configuration from keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn build_compare_opts(
    ym: f64, yp: f64, softness: f64, soft_value: bool, soft_grad: bool, percent: bool,
) -> PyResult<CompareOptions<Sigmoid>> {
    let threshold = build_threshold_opts(ym, yp, softness, soft_value, soft_grad)?;
    Ok(CompareOptions::new(threshold, percent))
}

/// Interpolation curves selectable by name from Python.
#[cfg(feature = "python-bindings")]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpolationName {
    Sigmoid,
    Tanh,
}

#[cfg(feature = "python-bindings")]
impl InterpolationName {
    pub fn parse(name: &str) -> PyResult<Self> {
        match name.to_lowercase().as_str() {
            "sigmoid" => Ok(InterpolationName::Sigmoid),
            "tanh" => Ok(InterpolationName::Tanh),
            other => Err(PyValueError::new_err(format!(
                "invalid interpolation {:?} (expected 'sigmoid' or 'tanh')",
                other
            ))),
        }
    }

    /// Run `f` with the threshold configuration specialised to this curve.
    pub fn dispatch<R>(
        self, opts: ThresholdOptions<Sigmoid>,
        f_sigmoid: impl FnOnce(&ThresholdOptions<Sigmoid>) -> R,
        f_tanh: impl FnOnce(&ThresholdOptions<TanhStep>) -> R,
    ) -> R {
        match self {
            InterpolationName::Sigmoid => f_sigmoid(&opts),
            InterpolationName::Tanh => f_tanh(&opts.with_interpolation(TanhStep)),
        }
    }
}
