//! engine::expr — the host expression contract and the eager hosts.
//!
//! Purpose
//! -------
//! Name exactly the primitives the soft operators need from a numeric host,
//! so every operator in [`crate::softops`] and [`crate::normalize`] is written
//! once, generically, and runs unchanged on plain values and on
//! gradient-recording values.
//!
//! Key behaviors
//! -------------
//! - [`Expr`] lists elementwise broadcasting arithmetic, scalar affine maps,
//!   unary kernels, a strict step, NaN-propagating clamps and `detach`.
//! - [`Expr::override_grad`] is the single place where a forward value and a
//!   gradient source are fused; its default body is the classic
//!   `soft + detach(hard - soft)` construction.
//! - `f64` and `ArrayD<f64>` implement [`Expr`] as eager hosts that record no
//!   gradient: `detach` is the identity and `override_grad` returns `hard`
//!   broadcast against `soft` so the forward value is bit-exact.
//!
//! Invariants & assumptions
//! ------------------------
//! - All methods are pure; none mutates `self`.
//! - Binary methods follow ndarray co-broadcasting. Incompatible shapes
//!   panic inside ndarray; this layer adds no validation of its own.
//! - Kernels are taken from [`crate::engine::kernels`] so all hosts agree on
//!   forward values.
//!
//! Conventions
//! -----------
//! - `clamp_min(lo)` is `max(lo, x)` and `clamp_max(hi)` is `min(hi, x)`.
//! - `step` is the strict Heaviside step (`x > 0`), carrying no gradient.
use ndarray::ArrayD;

use crate::engine::kernels;

/// Expr — an elementwise numeric expression a soft operator can be built on.
///
/// Purpose
/// -------
/// Abstract over the host that evaluates the soft operators: eager scalars,
/// eager arrays, or a gradient-recording wrapper such as
/// [`Dual`](crate::engine::Dual).
///
/// Key behaviors
/// -------------
/// - Arithmetic between two expressions broadcasts to the common shape.
/// - `detach` returns the same forward value with no gradient path.
/// - `override_grad(hard, soft)` evaluates as `hard` and differentiates as
///   `soft`.
///
/// Panics
/// ------
/// - Binary methods panic when the operand shapes cannot be broadcast
///   together (ndarray's native shape fault).
///
/// Notes
/// -----
/// - Implementors recording gradients should override
///   [`Expr::override_grad`] when they can combine value and gradient
///   exactly; the default `soft + detach(hard - soft)` may differ from `hard`
///   by one rounding step.
pub trait Expr: Clone {
    /// Elementwise `self + other`.
    fn add(&self, other: &Self) -> Self;
    /// Elementwise `self - other`.
    fn sub(&self, other: &Self) -> Self;
    /// Elementwise `self * other`.
    fn mul(&self, other: &Self) -> Self;
    /// Elementwise `self / other`.
    fn div(&self, other: &Self) -> Self;

    /// `-self`.
    fn neg(&self) -> Self;
    /// `k * self`.
    fn scale(&self, k: f64) -> Self;
    /// `self + k`.
    fn offset(&self, k: f64) -> Self;
    /// `self / k`.
    fn div_scalar(&self, k: f64) -> Self;

    fn floor(&self) -> Self;
    fn ceil(&self) -> Self;
    /// Round half to even.
    fn round(&self) -> Self;
    fn ln(&self) -> Self;
    fn exp(&self) -> Self;
    fn tanh(&self) -> Self;
    fn sigmoid(&self) -> Self;

    /// `1` where `self > 0`, else `0`; never carries a gradient.
    fn step(&self) -> Self;
    /// `max(lo, self)`, propagating NaN.
    fn clamp_min(&self, lo: f64) -> Self;
    /// `min(hi, self)`, propagating NaN.
    fn clamp_max(&self, hi: f64) -> Self;

    /// Same forward value, zero gradient.
    fn detach(&self) -> Self;

    /// Evaluate as `hard`, differentiate as `soft`.
    ///
    /// The default body is `soft + detach(hard - soft)`: forward the
    /// difference cancels, backward only `soft`'s path survives.
    fn override_grad(hard: &Self, soft: &Self) -> Self {
        soft.add(&hard.sub(soft).detach())
    }
}

impl Expr for f64 {
    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn div(&self, other: &Self) -> Self {
        self / other
    }

    fn neg(&self) -> Self {
        -*self
    }

    fn scale(&self, k: f64) -> Self {
        k * self
    }

    fn offset(&self, k: f64) -> Self {
        self + k
    }

    fn div_scalar(&self, k: f64) -> Self {
        self / k
    }

    fn floor(&self) -> Self {
        f64::floor(*self)
    }

    fn ceil(&self) -> Self {
        f64::ceil(*self)
    }

    fn round(&self) -> Self {
        kernels::round(*self)
    }

    fn ln(&self) -> Self {
        f64::ln(*self)
    }

    fn exp(&self) -> Self {
        f64::exp(*self)
    }

    fn tanh(&self) -> Self {
        f64::tanh(*self)
    }

    fn sigmoid(&self) -> Self {
        kernels::sigmoid(*self)
    }

    fn step(&self) -> Self {
        kernels::step(*self)
    }

    fn clamp_min(&self, lo: f64) -> Self {
        kernels::clamp_min(*self, lo)
    }

    fn clamp_max(&self, hi: f64) -> Self {
        kernels::clamp_max(*self, hi)
    }

    fn detach(&self) -> Self {
        *self
    }

    fn override_grad(hard: &Self, _soft: &Self) -> Self {
        *hard
    }
}

impl Expr for ArrayD<f64> {
    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn div(&self, other: &Self) -> Self {
        self / other
    }

    fn neg(&self) -> Self {
        self.mapv(|v| -v)
    }

    fn scale(&self, k: f64) -> Self {
        self.mapv(|v| k * v)
    }

    fn offset(&self, k: f64) -> Self {
        self.mapv(|v| v + k)
    }

    fn div_scalar(&self, k: f64) -> Self {
        self.mapv(|v| v / k)
    }

    fn floor(&self) -> Self {
        self.mapv(f64::floor)
    }

    fn ceil(&self) -> Self {
        self.mapv(f64::ceil)
    }

    fn round(&self) -> Self {
        self.mapv(kernels::round)
    }

    fn ln(&self) -> Self {
        self.mapv(f64::ln)
    }

    fn exp(&self) -> Self {
        self.mapv(f64::exp)
    }

    fn tanh(&self) -> Self {
        self.mapv(f64::tanh)
    }

    fn sigmoid(&self) -> Self {
        self.mapv(kernels::sigmoid)
    }

    fn step(&self) -> Self {
        self.mapv(kernels::step)
    }

    fn clamp_min(&self, lo: f64) -> Self {
        self.mapv(|v| kernels::clamp_min(v, lo))
    }

    fn clamp_max(&self, hi: f64) -> Self {
        self.mapv(|v| kernels::clamp_max(v, hi))
    }

    fn detach(&self) -> Self {
        self.clone()
    }

    // `hard + 0 * shape(soft)` broadcasts without letting NaN in `soft` leak
    // into the forward value.
    fn override_grad(hard: &Self, soft: &Self) -> Self {
        // `x + -0.0 == x` bitwise, signed zeros included.
        hard + &soft.mapv(|_| -0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{IxDyn, arr1, arr2};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Eager scalar and array hosts agreeing on kernel values.
    // - Broadcasting of binary methods on `ArrayD<f64>`.
    // - Exact forward value of `override_grad` on eager hosts, including the
    //   broadcast shape of the result.
    //
    // They intentionally DO NOT cover:
    // - Gradient recording, which lives in `engine::dual`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Scalar and array hosts evaluate the same kernels identically.
    //
    // Given
    // -----
    // - A small grid of inputs evaluated through both hosts.
    //
    // Expect
    // ------
    // - Elementwise bit-equality for every unary method.
    fn scalar_and_array_hosts_agree() {
        // Arrange
        let xs = [-2.5_f64, -0.5, 0.0, 0.5, 1.5, 3.2];
        let arr = arr1(&xs).into_dyn();

        // Act
        let floor = Expr::floor(&arr);
        let round = Expr::round(&arr);
        let sig = Expr::sigmoid(&arr);
        let tanh = Expr::tanh(&arr);

        // Assert
        for (i, &x) in xs.iter().enumerate() {
            assert_eq!(floor[i], Expr::floor(&x));
            assert_eq!(round[i], Expr::round(&x));
            assert_eq!(sig[i], Expr::sigmoid(&x));
            assert_eq!(tanh[i], Expr::tanh(&x));
        }
    }

    #[test]
    // Purpose
    // -------
    // Binary methods co-broadcast their operands.
    //
    // Given
    // -----
    // - A (2, 3) matrix and a length-3 row.
    //
    // Expect
    // ------
    // - The sum has shape (2, 3) and row-wise offsets.
    fn array_binary_methods_broadcast() {
        // Arrange
        let m = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn();
        let row = arr1(&[10.0, 20.0, 30.0]).into_dyn();

        // Act
        let sum = Expr::add(&m, &row);
        let ratio = Expr::div(&row, &m);

        // Assert
        assert_eq!(sum.shape(), &[2, 3]);
        assert_eq!(sum[IxDyn(&[1, 2])], 36.0);
        assert_relative_eq!(ratio[IxDyn(&[1, 0])], 2.5);
    }

    #[test]
    #[should_panic]
    // Purpose
    // -------
    // Incompatible shapes surface as ndarray's own panic.
    //
    // Given
    // -----
    // - Length-2 and length-3 vectors.
    //
    // Expect
    // ------
    // - Panic on `add`.
    fn array_shape_mismatch_panics() {
        let a = arr1(&[1.0, 2.0]).into_dyn();
        let b = arr1(&[1.0, 2.0, 3.0]).into_dyn();
        let _ = Expr::add(&a, &b);
    }

    #[test]
    // Purpose
    // -------
    // Eager `override_grad` returns `hard` exactly, broadcast to the pair's
    // shape, even if `soft` holds NaN.
    //
    // Given
    // -----
    // - hard = [[1], [2]] (2x1), soft = [NaN, 0.3, 0.7] (3).
    //
    // Expect
    // ------
    // - A 2x3 result whose rows are constant 1 and 2.
    fn eager_override_is_exact_and_broadcasts() {
        // Arrange
        let hard = arr2(&[[1.0], [2.0]]).into_dyn();
        let soft = arr1(&[f64::NAN, 0.3, 0.7]).into_dyn();

        // Act
        let out = <ArrayD<f64> as Expr>::override_grad(&hard, &soft);

        // Assert
        assert_eq!(out.shape(), &[2, 3]);
        assert!(out.iter().take(3).all(|&v| v == 1.0));
        assert!(out.iter().skip(3).all(|&v| v == 2.0));
        assert_eq!(<f64 as Expr>::override_grad(&0.25, &f64::NAN), 0.25);
    }

    #[test]
    // Purpose
    // -------
    // The default override construction is what non-exact hosts fall back
    // to; on an eager host it reproduces `hard` up to rounding.
    //
    // Given
    // -----
    // - A throwaway wrapper that only uses the trait's default body.
    //
    // Expect
    // ------
    // - `soft + (hard - soft)` is within one ulp-scale tolerance of `hard`.
    fn default_override_construction_recovers_hard() {
        #[derive(Clone, Debug)]
        struct Plain(f64);
        impl Expr for Plain {
            fn add(&self, o: &Self) -> Self {
                Plain(self.0 + o.0)
            }
            fn sub(&self, o: &Self) -> Self {
                Plain(self.0 - o.0)
            }
            fn mul(&self, o: &Self) -> Self {
                Plain(self.0 * o.0)
            }
            fn div(&self, o: &Self) -> Self {
                Plain(self.0 / o.0)
            }
            fn neg(&self) -> Self {
                Plain(-self.0)
            }
            fn scale(&self, k: f64) -> Self {
                Plain(k * self.0)
            }
            fn offset(&self, k: f64) -> Self {
                Plain(self.0 + k)
            }
            fn div_scalar(&self, k: f64) -> Self {
                Plain(self.0 / k)
            }
            fn floor(&self) -> Self {
                Plain(self.0.floor())
            }
            fn ceil(&self) -> Self {
                Plain(self.0.ceil())
            }
            fn round(&self) -> Self {
                Plain(kernels::round(self.0))
            }
            fn ln(&self) -> Self {
                Plain(self.0.ln())
            }
            fn exp(&self) -> Self {
                Plain(self.0.exp())
            }
            fn tanh(&self) -> Self {
                Plain(self.0.tanh())
            }
            fn sigmoid(&self) -> Self {
                Plain(kernels::sigmoid(self.0))
            }
            fn step(&self) -> Self {
                Plain(kernels::step(self.0))
            }
            fn clamp_min(&self, lo: f64) -> Self {
                Plain(kernels::clamp_min(self.0, lo))
            }
            fn clamp_max(&self, hi: f64) -> Self {
                Plain(kernels::clamp_max(self.0, hi))
            }
            fn detach(&self) -> Self {
                self.clone()
            }
        }

        let out = Plain::override_grad(&Plain(1.0), &Plain(kernels::sigmoid(1.0)));
        assert_relative_eq!(out.0, 1.0, epsilon = 1e-15);
    }
}
