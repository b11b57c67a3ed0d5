//! softops::rounding — floor, ceil and round with an identity gradient.
//!
//! Each operator evaluates to the exact host rounding of `x` while its
//! gradient is that of `x` itself (a straight-through estimator), so a
//! rounding layer never zeroes or breaks the gradient of a pipeline.
//! `round` resolves halves to even.
use crate::{engine::Expr, softops::gradient::with_grad};

/// `floor(x)` forward, gradient 1.
pub fn floor<E: Expr>(x: &E) -> E {
    with_grad(&x.floor(), x)
}

/// `ceil(x)` forward, gradient 1.
pub fn ceil<E: Expr>(x: &E) -> E {
    with_grad(&x.ceil(), x)
}

/// Half-to-even rounding forward, gradient 1.
pub fn round<E: Expr>(x: &E) -> E {
    with_grad(&x.round(), x)
}
