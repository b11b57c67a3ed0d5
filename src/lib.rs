//! rust_softops — straight-through soft operators with usable gradients,
//! plus optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the soft operators to Python via the `_rust_softops` extension
//! module. When the `python-bindings` feature is enabled, this module defines
//! the Python-facing functions and submodules used by the `rust_softops`
//! package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`engine`, `softops`, `normalize`,
//!   `calibration`) as the public crate surface.
//! - Define `#[pyfunction]`s and the `#[pymodule]` initializer for the
//!   `_rust_softops` Python extension. Operators return `(value, gradient)`
//!   array pairs where the gradient is taken w.r.t. the first argument.
//! - Create and register Python submodules (`softops`, `normalize`,
//!   `calibration`) under `rust_softops` so that dot-notation imports work
//!   as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input validation, and error mapping.
//! - Inputs that cannot be broadcast together panic inside ndarray; PyO3
//!   surfaces the panic as a Python exception.
//!
//! Conventions
//! -----------
//! - Configuration errors from core Rust code are converted to
//!   `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code depends directly on the inner modules and can ignore
//!   the PyO3 items guarded by the `python-bindings` feature.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules
//!   and by the integration tests under `tests/`.

pub mod calibration;
pub mod engine;
pub mod normalize;
pub mod softops;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArrayDyn};

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::{CalibrationOptions, CalibrationOutcome, calibrate_level},
    engine::Dual,
    normalize::{Normalizer, ScaleKind},
    softops::{CompareOptions, PositiveOptions},
    utils::{
        InterpolationName, PyPair, build_compare_opts, build_threshold_opts, dual_to_py,
        extract_values, extract_vector,
    },
};

// ---- softops ---------------------------------------------------------------

/// `floor(x)` with gradient 1. Returns `(value, gradient)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "floor")]
fn py_floor<'py>(py: Python<'py>, x: &Bound<'py, PyAny>) -> PyResult<PyPair<'py>> {
    let x = Dual::variable(extract_values(x)?);
    Ok(dual_to_py(py, softops::floor(&x)))
}

/// `ceil(x)` with gradient 1. Returns `(value, gradient)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "ceil")]
fn py_ceil<'py>(py: Python<'py>, x: &Bound<'py, PyAny>) -> PyResult<PyPair<'py>> {
    let x = Dual::variable(extract_values(x)?);
    Ok(dual_to_py(py, softops::ceil(&x)))
}

/// Half-to-even `round(x)` with gradient 1. Returns `(value, gradient)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "round")]
fn py_round<'py>(py: Python<'py>, x: &Bound<'py, PyAny>) -> PyResult<PyPair<'py>> {
    let x = Dual::variable(extract_values(x)?);
    Ok(dual_to_py(py, softops::round(&x)))
}

/// Soft threshold of `x` at 0. Returns `(value, d value / d x)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "threshold")]
#[pyo3(
    text_signature = "(x, /, ym=0.0, yp=1.0, softness=1.0, soft_value=False, soft_grad=True, interpolation='sigmoid')",
    signature = (x, ym = 0.0, yp = 1.0, softness = 1.0, soft_value = false, soft_grad = true, interpolation = "sigmoid")
)]
#[allow(clippy::too_many_arguments)]
fn py_threshold<'py>(
    py: Python<'py>, x: &Bound<'py, PyAny>, ym: f64, yp: f64, softness: f64, soft_value: bool,
    soft_grad: bool, interpolation: &str,
) -> PyResult<PyPair<'py>> {
    let opts = build_threshold_opts(ym, yp, softness, soft_value, soft_grad)?;
    let curve = InterpolationName::parse(interpolation)?;
    let x = Dual::variable(extract_values(x)?);
    let out = curve.dispatch(
        opts,
        |o| softops::threshold(&x, o),
        |o| softops::threshold(&x, o),
    );
    Ok(dual_to_py(py, out))
}

#[cfg(feature = "python-bindings")]
type CompareFn = fn(&Dual, &Dual, &CompareOptions) -> Dual;

#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
fn compare_py<'py>(
    py: Python<'py>, op: CompareFn, a: &Bound<'py, PyAny>, b: &Bound<'py, PyAny>, ym: f64,
    yp: f64, softness: f64, soft_value: bool, soft_grad: bool, percent: bool,
) -> PyResult<PyPair<'py>> {
    let opts = build_compare_opts(ym, yp, softness, soft_value, soft_grad, percent)?;
    let a = Dual::variable(extract_values(a)?);
    let b = Dual::constant(extract_values(b)?);
    Ok(dual_to_py(py, op(&a, &b, &opts)))
}

/// Soft `a > b`. Returns `(value, d value / d a)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "gt")]
#[pyo3(signature = (a, b, ym = 0.0, yp = 1.0, softness = 1.0, soft_value = false, soft_grad = true, percent = true))]
#[allow(clippy::too_many_arguments)]
fn py_gt<'py>(
    py: Python<'py>, a: &Bound<'py, PyAny>, b: &Bound<'py, PyAny>, ym: f64, yp: f64,
    softness: f64, soft_value: bool, soft_grad: bool, percent: bool,
) -> PyResult<PyPair<'py>> {
    compare_py(py, softops::gt, a, b, ym, yp, softness, soft_value, soft_grad, percent)
}

/// Soft `a < b`. Returns `(value, d value / d a)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "lt")]
#[pyo3(signature = (a, b, ym = 0.0, yp = 1.0, softness = 1.0, soft_value = false, soft_grad = true, percent = true))]
#[allow(clippy::too_many_arguments)]
fn py_lt<'py>(
    py: Python<'py>, a: &Bound<'py, PyAny>, b: &Bound<'py, PyAny>, ym: f64, yp: f64,
    softness: f64, soft_value: bool, soft_grad: bool, percent: bool,
) -> PyResult<PyPair<'py>> {
    compare_py(py, softops::lt, a, b, ym, yp, softness, soft_value, soft_grad, percent)
}

/// Soft `a >= b`. Returns `(value, d value / d a)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "gte")]
#[pyo3(signature = (a, b, ym = 0.0, yp = 1.0, softness = 1.0, soft_value = false, soft_grad = true, percent = true))]
#[allow(clippy::too_many_arguments)]
fn py_gte<'py>(
    py: Python<'py>, a: &Bound<'py, PyAny>, b: &Bound<'py, PyAny>, ym: f64, yp: f64,
    softness: f64, soft_value: bool, soft_grad: bool, percent: bool,
) -> PyResult<PyPair<'py>> {
    compare_py(py, softops::gte, a, b, ym, yp, softness, soft_value, soft_grad, percent)
}

/// Soft `a <= b`. Returns `(value, d value / d a)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "lte")]
#[pyo3(signature = (a, b, ym = 0.0, yp = 1.0, softness = 1.0, soft_value = false, soft_grad = true, percent = true))]
#[allow(clippy::too_many_arguments)]
fn py_lte<'py>(
    py: Python<'py>, a: &Bound<'py, PyAny>, b: &Bound<'py, PyAny>, ym: f64, yp: f64,
    softness: f64, soft_value: bool, soft_grad: bool, percent: bool,
) -> PyResult<PyPair<'py>> {
    compare_py(py, softops::lte, a, b, ym, yp, softness, soft_value, soft_grad, percent)
}

/// Soft indicator of `x >= 1` for counts. Returns `(value, d value / d x)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "positive")]
#[pyo3(signature = (x, softness = 1.0, soft_value = false, soft_grad = true))]
fn py_positive<'py>(
    py: Python<'py>, x: &Bound<'py, PyAny>, softness: f64, soft_value: bool, soft_grad: bool,
) -> PyResult<PyPair<'py>> {
    let opts = PositiveOptions::new(softness, soft_value, soft_grad)?;
    let x = Dual::variable(extract_values(x)?);
    Ok(dual_to_py(py, softops::positive(&x, &opts)))
}

/// `100 ln(a / b)`. Returns `(value, d value / d a)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "perc_variation")]
fn py_perc_variation<'py>(
    py: Python<'py>, a: &Bound<'py, PyAny>, b: &Bound<'py, PyAny>,
) -> PyResult<PyPair<'py>> {
    let a = Dual::variable(extract_values(a)?);
    let b = Dual::constant(extract_values(b)?);
    Ok(dual_to_py(py, softops::perc_variation(&a, &b)))
}

// ---- normalize -------------------------------------------------------------

/// Express `value` relative to `wrt` on the named scale.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "normalize")]
#[pyo3(signature = (value, wrt = None, scale = "log_perc", eps = normalize::DEFAULT_EPS))]
fn py_normalize<'py>(
    py: Python<'py>, value: &Bound<'py, PyAny>, wrt: Option<&Bound<'py, PyAny>>, scale: &str,
    eps: f64,
) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
    let scale = scale.parse::<ScaleKind>()?.with_eps(eps)?;
    let value = extract_values(value)?;
    let wrt = match wrt {
        Some(w) => extract_values(w)?,
        None => ndarray::arr0(1.0).into_dyn(),
    };
    Ok(scale.normalize(&value, &wrt).into_pyarray(py))
}

/// Inverse of `normalize`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "denormalize")]
#[pyo3(signature = (normalized, wrt = None, scale = "log_perc", eps = normalize::DEFAULT_EPS))]
fn py_denormalize<'py>(
    py: Python<'py>, normalized: &Bound<'py, PyAny>, wrt: Option<&Bound<'py, PyAny>>,
    scale: &str, eps: f64,
) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
    let scale = scale.parse::<ScaleKind>()?.with_eps(eps)?;
    let normalized = extract_values(normalized)?;
    let wrt = match wrt {
        Some(w) => extract_values(w)?,
        None => ndarray::arr0(1.0).into_dyn(),
    };
    Ok(scale.denormalize(&normalized, &wrt).into_pyarray(py))
}

// ---- calibration -----------------------------------------------------------

/// LevelFit — Python-facing result of `calibrate_level`.
///
/// Notes
/// -----
/// - Rust code should prefer [`CalibrationOutcome`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_softops.calibration")]
pub struct LevelFit {
    inner: CalibrationOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl LevelFit {
    #[getter]
    pub fn level(&self) -> f64 {
        self.inner.level
    }

    #[getter]
    pub fn loss(&self) -> f64 {
        self.inner.loss
    }

    #[getter]
    pub fn accuracy(&self) -> f64 {
        self.inner.accuracy
    }

    #[getter]
    pub fn iterations(&self) -> u64 {
        self.inner.iterations
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "LevelFit(level={:.6}, loss={:.6}, accuracy={:.4}, iterations={})",
            self.inner.level, self.inner.loss, self.inner.accuracy, self.inner.iterations
        )
    }
}

/// Fit the level of `gt(price, level)` (or its inverse) to 0/1 labels.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "calibrate_level")]
#[pyo3(signature = (
    prices, labels, level0, softness = 1.0, percent = true, inverted = false,
    step_size = calibration::options::DEFAULT_STEP_SIZE,
    max_iter = calibration::options::DEFAULT_MAX_ITER, verbose = false
))]
#[allow(clippy::too_many_arguments)]
fn py_calibrate_level<'py>(
    prices: &Bound<'py, PyAny>, labels: &Bound<'py, PyAny>, level0: f64, softness: f64,
    percent: bool, inverted: bool, step_size: f64, max_iter: u64, verbose: bool,
) -> PyResult<LevelFit> {
    let prices = extract_vector(prices, "prices")?;
    let labels = extract_vector(labels, "labels")?;
    let (ym, yp) = if inverted { (1.0, 0.0) } else { (0.0, 1.0) };
    let compare = build_compare_opts(ym, yp, softness, false, true, percent)?;
    let opts = CalibrationOptions::new(compare, step_size, max_iter, verbose)?;
    let inner = calibrate_level(&prices, &labels, level0, &opts)?;
    Ok(LevelFit { inner })
}

// ---- module ----------------------------------------------------------------

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_softops<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let softops_mod = PyModule::new(_py, "softops")?;
    let normalize_mod = PyModule::new(_py, "normalize")?;
    let calibration_mod = PyModule::new(_py, "calibration")?;
    softops_functions(_py, m, &softops_mod)?;
    normalize_functions(_py, m, &normalize_mod)?;
    calibration_functions(_py, m, &calibration_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    let modules = _py.import("sys")?.getattr("modules")?;
    modules.set_item("rust_softops.softops", softops_mod)?;
    modules.set_item("rust_softops.normalize", normalize_mod)?;
    modules.set_item("rust_softops.calibration", calibration_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn softops_functions<'py>(
    _py: Python, rust_softops: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_floor, m)?)?;
    m.add_function(wrap_pyfunction!(py_ceil, m)?)?;
    m.add_function(wrap_pyfunction!(py_round, m)?)?;
    m.add_function(wrap_pyfunction!(py_threshold, m)?)?;
    m.add_function(wrap_pyfunction!(py_gt, m)?)?;
    m.add_function(wrap_pyfunction!(py_lt, m)?)?;
    m.add_function(wrap_pyfunction!(py_gte, m)?)?;
    m.add_function(wrap_pyfunction!(py_lte, m)?)?;
    m.add_function(wrap_pyfunction!(py_positive, m)?)?;
    m.add_function(wrap_pyfunction!(py_perc_variation, m)?)?;
    rust_softops.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn normalize_functions<'py>(
    _py: Python, rust_softops: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_normalize, m)?)?;
    m.add_function(wrap_pyfunction!(py_denormalize, m)?)?;
    rust_softops.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn calibration_functions<'py>(
    _py: Python, rust_softops: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<LevelFit>()?;
    m.add_function(wrap_pyfunction!(py_calibrate_level, m)?)?;
    rust_softops.add_submodule(m)?;
    Ok(())
}
