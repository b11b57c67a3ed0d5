//! softops — straight-through relaxations of rounding, thresholds and
//! comparisons.
//!
//! Purpose
//! -------
//! Give usable gradients to operations whose true derivative is zero almost
//! everywhere or undefined, so they can sit inside gradient-based training.
//! Each operator evaluates exactly like its discontinuous counterpart and
//! differentiates like a smooth surrogate.
//!
//! Key behaviors
//! -------------
//! - [`with_grad`] fuses a forward value with a surrogate gradient source.
//! - [`floor`], [`ceil`], [`round`] return the exact rounding with gradient 1.
//! - [`threshold`] steps between two levels with a configurable smooth
//!   transition; [`gt`], [`lt`], [`lte`], [`gte`] threshold (log-percent)
//!   differences.
//! - [`positive`] is a saturating indicator of `x >= 1` for counts.
//!
//! Invariants & assumptions
//! ------------------------
//! - Operators are pure, elementwise and generic over any [`Expr`] host.
//! - Numeric faults travel as NaN/Inf; only configuration constructors
//!   validate and return [`SoftOpsError`].
//!
//! Conventions
//! -----------
//! - Defaults: `ym = 0`, `yp = 1`, `softness = 1`, hard forward and soft
//!   gradient; comparisons default to percent mode.
//!
//! Testing notes
//! -------------
//! - Each submodule tests its operator on eager hosts for forward values and
//!   on [`Dual`](crate::engine::Dual) for recorded gradients.
//!
//! [`Expr`]: crate::engine::Expr

pub mod compare;
pub mod errors;
pub mod gradient;
pub mod positive;
pub mod rounding;
pub mod threshold;

pub use self::compare::{CompareOptions, gt, gte, lt, lte, perc_variation};
pub use self::errors::{SoftOpsError, SoftOpsResult};
pub use self::gradient::with_grad;
pub use self::positive::{PositiveOptions, positive};
pub use self::rounding::{ceil, floor, round};
pub use self::threshold::{Interpolation, Sigmoid, TanhStep, ThresholdOptions, threshold};

pub mod prelude {
    pub use super::compare::{CompareOptions, gt, gte, lt, lte, perc_variation};
    pub use super::errors::{SoftOpsError, SoftOpsResult};
    pub use super::gradient::with_grad;
    pub use super::positive::{PositiveOptions, positive};
    pub use super::rounding::{ceil, floor, round};
    pub use super::threshold::{Interpolation, Sigmoid, TanhStep, ThresholdOptions, threshold};
}
