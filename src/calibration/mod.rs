//! calibration — fitting a comparison level through straight-through
//! gradients.
//!
//! Purpose
//! -------
//! Show the soft operators doing their job inside a training loop: the
//! level `c` of a rule `label ≈ gt(price, c)` is fitted by plain gradient
//! descent even though the rule's forward value is a hard step whose true
//! derivative is zero almost everywhere.
//!
//! Key behaviors
//! -------------
//! - [`LevelProblem`] implements `argmin`'s `CostFunction` and `Gradient`,
//!   recording `dL/dc` with a [`Dual`](crate::engine::Dual) seed.
//! - [`calibrate_level`] runs `argmin`'s Landweber iteration (fixed step)
//!   and returns a [`CalibrationOutcome`].
//! - [`gradient_check`] compares recorded gradients with `finitediff`
//!   central differences of the smooth surrogate cost.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs and options are validated before the solver starts; failures
//!   during iteration come back as [`CalibError`] through argmin's error
//!   type.
//! - Comparison levels are `(0, 1)` or `(1, 0)` so predictions and labels
//!   share a scale.
//!
//! Conventions
//! -----------
//! - Parameters and gradients are one-element `ndarray` vectors
//!   ([`Theta`], [`Grad`]).
//! - The numeric core stays silent; only the runner prints, and only when
//!   `verbose` is set.
//!
//! Testing notes
//! -------------
//! - Unit tests cover validation, closed-form gradients, finite-difference
//!   agreement and convergence into the gap between the label classes.

pub mod errors;
pub mod finite_diff;
pub mod options;
pub mod problem;
pub mod run;

pub use self::errors::{CalibError, CalibResult};
pub use self::finite_diff::gradient_check;
pub use self::options::CalibrationOptions;
pub use self::problem::{Cost, Grad, LevelProblem, Theta};
pub use self::run::{CalibrationOutcome, calibrate_level};

pub mod prelude {
    pub use super::errors::{CalibError, CalibResult};
    pub use super::options::CalibrationOptions;
    pub use super::run::{CalibrationOutcome, calibrate_level};
}
