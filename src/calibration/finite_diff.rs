//! calibration::finite_diff — finite-difference check of recorded gradients.
//!
//! Purpose
//! -------
//! Compare an analytic (recorded) gradient against central differences of a
//! cost, without exposing the `finitediff` API to callers.
//!
//! Key behaviors
//! -------------
//! - [`gradient_check`] evaluates `cost` around `theta` with central
//!   differences and returns the largest absolute deviation from `grad`.
//! - Errors raised by `cost` during differencing are captured and returned
//!   instead of being turned into NaN.
//!
//! Conventions
//! -----------
//! - Only meaningful for smooth costs. The straight-through cost is piecewise
//!   constant in its forward value, so check the recorded gradient against
//!   [`LevelProblem::surrogate`](crate::calibration::LevelProblem::surrogate).
use std::cell::RefCell;

use finitediff::FiniteDiff;

use crate::calibration::{
    errors::{CalibError, CalibResult},
    problem::{Grad, Theta},
};

/// Largest absolute deviation between `grad` and a central-difference
/// gradient of `cost` at `theta`.
///
/// Errors
/// ------
/// - `CalibError::GradientDimMismatch`
///   `grad.len() != theta.len()`.
/// - `CalibError::InvalidGradient`
///   A non-finite entry in `grad` or in the finite-difference gradient.
/// - Any error returned by `cost` while differencing.
pub fn gradient_check<F>(theta: &Theta, cost: F, grad: &Grad) -> CalibResult<f64>
where
    F: Fn(&Theta) -> CalibResult<f64>,
{
    validate_grad(grad, theta.len())?;

    let closure_err: RefCell<Option<CalibError>> = RefCell::new(None);
    let cost_func = |theta: &Theta| -> f64 {
        match cost(theta) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let fd_grad = theta.central_diff(&cost_func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;

    Ok(fd_grad.iter().zip(grad.iter()).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max))
}

fn validate_grad(grad: &Grad, dim: usize) -> CalibResult<()> {
    if grad.len() != dim {
        return Err(CalibError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(CalibError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}
