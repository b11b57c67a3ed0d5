//! normalize — percentage and log-percentage scales relative to a
//! reference, with exact inverses.
//!
//! Purpose
//! -------
//! Convert prices and other positive quantities into relative scales that
//! comparisons and training metrics can share, and convert them back.
//!
//! Key behaviors
//! -------------
//! - [`Perc`] and [`LogPerc`] implement [`Normalizer`] over any
//!   [`Expr`](crate::engine::Expr) host, so normalized quantities carry
//!   gradients when built from a [`Dual`](crate::engine::Dual).
//! - [`ScaleKind`] parses a scale name and builds a runtime-selected
//!   [`Scale`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The clamp floor `eps` is an explicit field of each scale, defaulting to
//!   [`DEFAULT_EPS`]; nothing here reads global state.
//! - Unlike [`perc_variation`](crate::softops::perc_variation), these scales
//!   clamp their reference (and, for the log scale, the value) at `eps`.

pub mod errors;
pub mod kind;
pub mod scales;

pub use self::errors::{NormalizeError, NormalizeResult};
pub use self::kind::{Scale, ScaleKind};
pub use self::scales::{DEFAULT_EPS, LogPerc, Normalizer, Perc};

pub mod prelude {
    pub use super::errors::{NormalizeError, NormalizeResult};
    pub use super::kind::{Scale, ScaleKind};
    pub use super::scales::{DEFAULT_EPS, LogPerc, Normalizer, Perc};
}
