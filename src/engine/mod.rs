//! engine — host expressions the soft operators are written against.
//!
//! Purpose
//! -------
//! Name the handful of primitives a host numeric engine must offer for the
//! straight-through operators to be expressible, and provide three hosts:
//! eager `f64`, eager `ndarray::ArrayD<f64>`, and the gradient-recording
//! [`Dual`].
//!
//! Key behaviors
//! -------------
//! - [`Expr`] lists elementwise broadcasting arithmetic, unary kernels, a
//!   strict step, NaN-propagating clamps and `detach`, plus the provided
//!   `override_grad` construction `soft + detach(hard - soft)`.
//! - [`kernels`] defines every scalar map once with its derivative so all
//!   hosts agree on forward values.
//! - [`Dual`] carries `(value, tangent)` and implements `override_grad` as
//!   an explicit value/gradient split, which keeps forward values bit-exact.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every primitive is elementwise; broadcasting follows ndarray's
//!   co-broadcasting rules and incompatible shapes panic.
//! - Eager hosts record no gradient; `detach` is the identity on them.
//!
//! Conventions
//! -----------
//! - Scalars enter expressions through `scale`, `offset` and `div_scalar`
//!   rather than being lifted into the host type.
//!
//! Downstream usage
//! ----------------
//! - `softops` is generic over `E: Expr`; callers pick the host by the type
//!   of the input they pass.
//!
//! Testing notes
//! -------------
//! - Unit tests check kernel edge cases, host agreement, broadcasting, and
//!   the chain rules of `Dual` against closed forms.

pub mod dual;
pub mod errors;
pub mod expr;
pub mod kernels;

pub use self::dual::Dual;
pub use self::errors::{EngineError, EngineResult};
pub use self::expr::Expr;

pub mod prelude {
    pub use super::dual::Dual;
    pub use super::errors::{EngineError, EngineResult};
    pub use super::expr::Expr;
}
