//! softops::compare — soft `>`, `<`, `<=`, `>=` built on [`threshold`].
//!
//! Purpose
//! -------
//! Model "a exceeds b" as thresholding the difference of `a` and `b` at zero,
//! either in absolute terms (`a - b`) or as a percentage variation
//! `100 ln(a / b)`, in which case `softness` reads as a percent.
//!
//! Key behaviors
//! -------------
//! - `gt` thresholds `d(a, b)`, `lt` thresholds `-d(a, b)`.
//! - `lte` is `gt` with the output levels exchanged and `gte` is `lt` with
//!   the output levels exchanged. At `a == b` the hard branch therefore
//!   yields `ym` for `gt`/`lt` and `yp` for `lte`/`gte`, and the smooth
//!   curves of `lte`/`gte` are the mirror images of those of `gt`/`lt`.
//! - For `a != b` exactly one of `gt`, `lt` hard-evaluates to `yp`.
//!
//! Invariants & assumptions
//! ------------------------
//! - In percent mode `a > 0` and `b > 0`. [`perc_variation`] does not clamp,
//!   so other inputs produce NaN (or ±inf) in the output.
//!
//! [`threshold`]: crate::softops::threshold::threshold
use crate::{
    engine::Expr,
    softops::threshold::{Interpolation, Sigmoid, ThresholdOptions, threshold_between},
};

/// CompareOptions — threshold configuration plus the difference measure.
///
/// Fields
/// ------
/// - `threshold`: `ThresholdOptions<I>`
///   Levels, softness, branch selection and curve.
/// - `percent`: `bool`
///   Compare on [`perc_variation`] instead of the plain difference. Default
///   `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions<I = Sigmoid> {
    pub threshold: ThresholdOptions<I>,
    pub percent: bool,
}

impl<I> CompareOptions<I> {
    pub fn new(threshold: ThresholdOptions<I>, percent: bool) -> Self {
        Self { threshold, percent }
    }

    pub fn with_percent(mut self, percent: bool) -> Self {
        self.percent = percent;
        self
    }
}

impl Default for CompareOptions<Sigmoid> {
    fn default() -> Self {
        Self { threshold: ThresholdOptions::default(), percent: true }
    }
}

/// Log-percent variation of `a` with respect to `b`: `100 * ln(a / b)`.
///
/// Matches the ordinary percent difference to first order and is additive
/// under composition. Requires `a > 0` and `b > 0`; no guard is applied.
pub fn perc_variation<E: Expr>(a: &E, b: &E) -> E {
    a.div(b).ln().scale(100.0)
}

/// Soft `a > b`.
pub fn gt<E, I>(a: &E, b: &E, opts: &CompareOptions<I>) -> E
where
    E: Expr,
    I: Interpolation<E>,
{
    let d = difference(a, b, opts.percent);
    let t = &opts.threshold;
    threshold_between(&d, t.ym, t.yp, t)
}

/// Soft `a < b`.
pub fn lt<E, I>(a: &E, b: &E, opts: &CompareOptions<I>) -> E
where
    E: Expr,
    I: Interpolation<E>,
{
    let d = difference(a, b, opts.percent).neg();
    let t = &opts.threshold;
    threshold_between(&d, t.ym, t.yp, t)
}

/// Soft `a <= b`: [`gt`] with `ym` and `yp` exchanged.
pub fn lte<E, I>(a: &E, b: &E, opts: &CompareOptions<I>) -> E
where
    E: Expr,
    I: Interpolation<E>,
{
    let d = difference(a, b, opts.percent);
    let t = &opts.threshold;
    threshold_between(&d, t.yp, t.ym, t)
}

/// Soft `a >= b`: [`lt`] with `ym` and `yp` exchanged.
pub fn gte<E, I>(a: &E, b: &E, opts: &CompareOptions<I>) -> E
where
    E: Expr,
    I: Interpolation<E>,
{
    let d = difference(a, b, opts.percent).neg();
    let t = &opts.threshold;
    threshold_between(&d, t.yp, t.ym, t)
}

fn difference<E: Expr>(a: &E, b: &E, percent: bool) -> E {
    if percent { perc_variation(a, b) } else { a.sub(b) }
}
