//! softops::threshold — the parametrized hard/soft step.
//!
//! Purpose
//! -------
//! Map `x` to one of two output levels `ym` (for `x <= 0`) and `yp` (for
//! `x > 0`) while exposing a smooth transition for the gradient. The smooth
//! curve is `ym + (yp - ym) * q(x / softness)` with `q` an interpolation
//! function onto (0, 1).
//!
//! Key behaviors
//! -------------
//! - The hard branch is exactly `ym` or exactly `yp`, never a blend; the tie
//!   at `x = 0` resolves to `ym`.
//! - `soft_value` picks which branch is returned forward; `soft_grad` picks
//!   which branch the gradient is taken from. The default (hard value, soft
//!   gradient) is the straight-through threshold.
//! - `softness` scales the transition width; larger values give a wider,
//!   smoother transition.
//!
//! Invariants & assumptions
//! ------------------------
//! - `softness > 0`. [`ThresholdOptions::new`] enforces it; the operator
//!   itself does not, so a hand-built configuration with `softness <= 0`
//!   yields the host's inf/NaN artifacts.
//! - Monotonic non-decreasing in `x` whenever `yp > ym` and the
//!   interpolation is monotonic.
//!
//! Conventions
//! -----------
//! - Interpolations implement [`Interpolation`]. [`Sigmoid`] is the default,
//!   [`TanhStep`] is `(1 + tanh x) / 2`, and any `Fn(&E) -> E` closure works.
use crate::{
    engine::Expr,
    softops::{
        errors::{SoftOpsError, SoftOpsResult},
        gradient::with_grad,
    },
};

/// Default lower output level.
pub const DEFAULT_YM: f64 = 0.0;
/// Default upper output level.
pub const DEFAULT_YP: f64 = 1.0;
/// Default transition width.
pub const DEFAULT_SOFTNESS: f64 = 1.0;

/// A monotonic map from the real line onto (0, 1).
pub trait Interpolation<E> {
    fn interpolate(&self, x: &E) -> E;
}

/// Logistic interpolation `1 / (1 + e^-x)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sigmoid;

/// `(1 + tanh x) / 2`, a logistic curve twice as steep as [`Sigmoid`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TanhStep;

impl<E: Expr> Interpolation<E> for Sigmoid {
    fn interpolate(&self, x: &E) -> E {
        x.sigmoid()
    }
}

impl<E: Expr> Interpolation<E> for TanhStep {
    fn interpolate(&self, x: &E) -> E {
        x.tanh().offset(1.0).scale(0.5)
    }
}

impl<E, F> Interpolation<E> for F
where
    F: Fn(&E) -> E,
{
    fn interpolate(&self, x: &E) -> E {
        self(x)
    }
}

/// ThresholdOptions — configuration of [`threshold`].
///
/// Fields
/// ------
/// - `ym`: `f64`
///   Output level for `x <= 0`. Default `0`.
/// - `yp`: `f64`
///   Output level for `x > 0`. Default `1`.
/// - `softness`: `f64`
///   Width of the smooth transition. Default `1`.
/// - `soft_value`: `bool`
///   Return the smooth curve forward instead of the hard step. Default
///   `false`.
/// - `soft_grad`: `bool`
///   Take the gradient from the smooth curve instead of the hard step.
///   Default `true`.
/// - `interpolation`: `I`
///   Transition curve. Default [`Sigmoid`].
///
/// Invariants
/// ----------
/// - Values built through [`ThresholdOptions::new`] have a finite, positive
///   `softness` and finite levels. The fields stay public; the operator
///   trusts whatever it is handed.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdOptions<I = Sigmoid> {
    pub ym: f64,
    pub yp: f64,
    pub softness: f64,
    pub soft_value: bool,
    pub soft_grad: bool,
    pub interpolation: I,
}

impl ThresholdOptions<Sigmoid> {
    /// Build a validated configuration with the sigmoid interpolation.
    ///
    /// Errors
    /// ------
    /// - `SoftOpsError::InvalidSoftness`
    ///   `softness` is non-finite or `<= 0`.
    /// - `SoftOpsError::InvalidLevel`
    ///   `ym` or `yp` is non-finite.
    pub fn new(
        ym: f64, yp: f64, softness: f64, soft_value: bool, soft_grad: bool,
    ) -> SoftOpsResult<Self> {
        verify_level("ym", ym)?;
        verify_level("yp", yp)?;
        verify_softness(softness)?;
        Ok(Self { ym, yp, softness, soft_value, soft_grad, interpolation: Sigmoid })
    }
}

impl Default for ThresholdOptions<Sigmoid> {
    fn default() -> Self {
        Self {
            ym: DEFAULT_YM,
            yp: DEFAULT_YP,
            softness: DEFAULT_SOFTNESS,
            soft_value: false,
            soft_grad: true,
            interpolation: Sigmoid,
        }
    }
}

impl<I> ThresholdOptions<I> {
    /// Replace the transition curve, keeping every other field.
    pub fn with_interpolation<J>(self, interpolation: J) -> ThresholdOptions<J> {
        ThresholdOptions {
            ym: self.ym,
            yp: self.yp,
            softness: self.softness,
            soft_value: self.soft_value,
            soft_grad: self.soft_grad,
            interpolation,
        }
    }

    pub fn with_soft_value(mut self, soft_value: bool) -> Self {
        self.soft_value = soft_value;
        self
    }

    pub fn with_soft_grad(mut self, soft_grad: bool) -> Self {
        self.soft_grad = soft_grad;
        self
    }

    /// Exchange `ym` and `yp`.
    pub fn swapped(mut self) -> Self {
        std::mem::swap(&mut self.ym, &mut self.yp);
        self
    }
}

/// Validate a transition width: finite and strictly positive.
///
/// # Errors
/// Returns [`SoftOpsError::InvalidSoftness`] otherwise.
pub fn verify_softness(softness: f64) -> SoftOpsResult<()> {
    if !softness.is_finite() {
        return Err(SoftOpsError::InvalidSoftness {
            value: softness,
            reason: "Softness must be finite.",
        });
    }
    if softness <= 0.0 {
        return Err(SoftOpsError::InvalidSoftness {
            value: softness,
            reason: "Softness must be positive.",
        });
    }
    Ok(())
}

fn verify_level(name: &'static str, value: f64) -> SoftOpsResult<()> {
    if !value.is_finite() {
        return Err(SoftOpsError::InvalidLevel { name, value });
    }
    Ok(())
}

/// Hard step to `ym`/`yp` forward with a smooth surrogate gradient.
///
/// Parameters
/// ----------
/// - `x`: `&E`
///   Decision variable; the step sits at `x = 0`.
/// - `opts`: `&ThresholdOptions<I>`
///   Levels, transition width, branch selection and curve.
///
/// Returns
/// -------
/// `E`
///   Same shape as `x`. Forward is `soft_y` if `opts.soft_value` else
///   `hard_y`; the gradient is that of `soft_y` if `opts.soft_grad` else
///   that of `hard_y` (zero almost everywhere).
pub fn threshold<E, I>(x: &E, opts: &ThresholdOptions<I>) -> E
where
    E: Expr,
    I: Interpolation<E>,
{
    threshold_between(x, opts.ym, opts.yp, opts)
}

// Shared body of `threshold` and the swapped-level comparisons, which reuse a
// configuration with the output levels exchanged.
pub(crate) fn threshold_between<E, I>(x: &E, ym: f64, yp: f64, opts: &ThresholdOptions<I>) -> E
where
    E: Expr,
    I: Interpolation<E>,
{
    let x = x.div_scalar(opts.softness);
    let soft_q = opts.interpolation.interpolate(&x);
    let hard_q = x.step();
    let soft_y = blend(&soft_q, ym, yp);
    let hard_y = blend(&hard_q, ym, yp);

    let value = if opts.soft_value { &soft_y } else { &hard_y };
    let grad = if opts.soft_grad { &soft_y } else { &hard_y };
    with_grad(value, grad)
}

// (1 - q) * ym + q * yp
fn blend<E: Expr>(q: &E, ym: f64, yp: f64) -> E {
    q.neg().offset(1.0).scale(ym).add(&q.scale(yp))
}
