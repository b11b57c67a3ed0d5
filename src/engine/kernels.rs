//! Scalar kernels shared by every host expression.
//!
//! Each elementwise primitive of [`Expr`](crate::engine::Expr) is defined
//! once here as an `f64 -> f64` map together with its derivative, so the
//! eager hosts and [`Dual`](crate::engine::Dual) agree bit-for-bit on
//! forward values.
//!
//! # Provided items
//! - [`sigmoid`] / [`sigmoid_deriv`]: logistic map evaluated without
//!   overflow for large `|x|`.
//! - [`tanh_deriv`], [`ln_deriv`]: derivatives of the std kernels.
//! - [`step`]: strict Heaviside step, `1` for `x > 0` and `0` otherwise.
//! - [`clamp_min`] / [`clamp_max`] and their derivatives: NaN-propagating
//!   `max(lo, x)` / `min(hi, x)`.
//! - [`chain`]: tangent update treating a zero tangent as a symbolic zero.

/// Numerically stable logistic function `1 / (1 + exp(-x))`.
///
/// Uses the `exp(x) / (1 + exp(x))` branch for negative `x` so neither
/// branch exponentiates a large positive number. NaN maps to NaN.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Derivative of [`sigmoid`], `s(x) * (1 - s(x))`.
#[inline]
pub fn sigmoid_deriv(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

/// Derivative of `tanh`, `1 - tanh(x)^2`.
#[inline]
pub fn tanh_deriv(x: f64) -> f64 {
    let t = x.tanh();
    1.0 - t * t
}

/// Derivative of the natural logarithm, `1 / x`.
#[inline]
pub fn ln_deriv(x: f64) -> f64 {
    1.0 / x
}

/// Strict Heaviside step: `1.0` when `x > 0`, else `0.0` (including `x = 0`
/// and NaN).
#[inline]
pub fn step(x: f64) -> f64 {
    if x > 0.0 { 1.0 } else { 0.0 }
}

/// Round half to even.
///
/// Matches the rounding mode of the usual tensor hosts rather than
/// `f64::round` (half away from zero).
#[inline]
pub fn round(x: f64) -> f64 {
    x.round_ties_even()
}

/// `max(lo, x)` that keeps NaN instead of returning `lo`.
#[inline]
pub fn clamp_min(x: f64, lo: f64) -> f64 {
    if x < lo { lo } else { x }
}

/// Derivative of [`clamp_min`] w.r.t. `x`: `1` only where `x > lo`.
#[inline]
pub fn clamp_min_deriv(x: f64, lo: f64) -> f64 {
    if x > lo { 1.0 } else { 0.0 }
}

/// `min(hi, x)` that keeps NaN instead of returning `hi`.
#[inline]
pub fn clamp_max(x: f64, hi: f64) -> f64 {
    if x > hi { hi } else { x }
}

/// Derivative of [`clamp_max`] w.r.t. `x`: `1` only where `x < hi`.
#[inline]
pub fn clamp_max_deriv(x: f64, hi: f64) -> f64 {
    if x < hi { 1.0 } else { 0.0 }
}

/// Push a tangent through a local derivative.
///
/// A zero tangent stays zero even when `deriv` is infinite or NaN, so
/// constants never pick up spurious NaN gradients from kernels such as
/// `ln` at the origin.
#[inline]
pub fn chain(tangent: f64, deriv: f64) -> f64 {
    if tangent == 0.0 { 0.0 } else { tangent * deriv }
}
