//! softops::positive — soft indicator of `x >= 1` for non-negative integers.
//!
//! The hard branch is `min(1, x)`, an exact indicator only on non-negative
//! integers. The smooth branch is `tanh(x / softness)`, and the gradient
//! source is `softness * tanh(x / softness)`, whose derivative
//! `sech^2(x / softness)` is 1 at the origin and decays for large `x`.
//! Forward output is clamped below at 0.
use crate::{
    engine::Expr,
    softops::{
        errors::SoftOpsResult,
        gradient::with_grad,
        threshold::{DEFAULT_SOFTNESS, verify_softness},
    },
};

/// PositiveOptions — configuration of [`positive`].
///
/// Fields
/// ------
/// - `softness`: `f64`
///   Scale of the `tanh` surrogate. Default `1`.
/// - `soft_value`: `bool`
///   Return `tanh(x / softness)` forward instead of `min(1, x)`. Default
///   `false`.
/// - `soft_grad`: `bool`
///   Take the gradient from the surrogate instead of `min(1, x)`. Default
///   `true`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositiveOptions {
    pub softness: f64,
    pub soft_value: bool,
    pub soft_grad: bool,
}

impl PositiveOptions {
    /// Errors
    /// ------
    /// - `SoftOpsError::InvalidSoftness`
    ///   `softness` is non-finite or `<= 0`.
    pub fn new(softness: f64, soft_value: bool, soft_grad: bool) -> SoftOpsResult<Self> {
        verify_softness(softness)?;
        Ok(Self { softness, soft_value, soft_grad })
    }
}

impl Default for PositiveOptions {
    fn default() -> Self {
        Self { softness: DEFAULT_SOFTNESS, soft_value: false, soft_grad: true }
    }
}

/// Soft test of `x >= 1` for non-negative integer `x`.
///
/// Returns
/// -------
/// `E`
///   Forward `max(0, soft_value ? tanh(x/s) : min(1, x))`; gradient of
///   `s * tanh(x/s)` when `soft_grad`, else of `min(1, x)`.
pub fn positive<E: Expr>(x: &E, opts: &PositiveOptions) -> E {
    let hard_y = x.clamp_max(1.0);
    let soft_y = x.div_scalar(opts.softness).tanh();

    let value = (if opts.soft_value { &soft_y } else { &hard_y }).clamp_min(0.0);
    let grad = if opts.soft_grad { soft_y.scale(opts.softness) } else { hard_y };
    with_grad(&value, &grad)
}
