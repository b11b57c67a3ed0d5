//! engine::dual — forward-mode elementwise expressions carrying a gradient
//! proxy next to their value.
//!
//! Purpose
//! -------
//! Provide the gradient-recording host the soft operators are tested and
//! trained with. A [`Dual`] stores the forward value of an expression and,
//! for every element, the derivative of that element with respect to a
//! seeded input.
//!
//! Key behaviors
//! -------------
//! - Seed inputs with [`Dual::variable`] (unit tangent), [`Dual::constant`]
//!   (zero tangent) or [`Dual::new`] (explicit tangent, shape-checked).
//! - Propagate tangents through every [`Expr`] primitive with the usual
//!   chain rules; binary rules co-broadcast value and tangent alike.
//! - [`Expr::detach`] zeroes the tangent; [`Expr::override_grad`] takes the
//!   value of `hard` and the tangent of `soft`, so the forward value is
//!   exact and the recorded gradient is exactly the surrogate's.
//!
//! Invariants & assumptions
//! ------------------------
//! - `value.shape() == tangent.shape()` at all times.
//! - Because every primitive is elementwise, the recorded tangent is the
//!   diagonal of the Jacobian, i.e. d out_i / d x_i for a seeded `x`; for a
//!   broadcast scalar seed it is d out_i / d x.
//! - A zero tangent is a symbolic zero (see [`kernels::chain`]): constants
//!   stay gradient-free even through `ln(0)` or `1/0`.
//!
//! Conventions
//! -----------
//! - Only one seed direction is tracked per evaluation. Gradients with
//!   respect to several parameters are obtained by one pass per parameter.
//!
//! Downstream usage
//! ----------------
//! - Tests seed an input with `Dual::variable`, run an operator, and read
//!   `tangent()` as the recorded gradient.
//! - The calibration problem seeds the level parameter and reduces the
//!   tangents into a scalar cost gradient.
use ndarray::{ArrayD, Zip};

use crate::engine::{
    errors::{EngineError, EngineResult},
    expr::Expr,
    kernels,
};

/// Dual — value plus per-element derivative w.r.t. one seeded input.
///
/// Fields
/// ------
/// - `value`: `ArrayD<f64>`
///   Forward value of the expression.
/// - `tangent`: `ArrayD<f64>`
///   Derivative of each element of `value` w.r.t. the seeded input.
///
/// Invariants
/// ----------
/// - `value` and `tangent` share one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Dual {
    value: ArrayD<f64>,
    tangent: ArrayD<f64>,
}

impl Dual {
    /// Build a dual from a value and an explicit tangent.
    ///
    /// Errors
    /// ------
    /// - `EngineError::TangentShapeMismatch`
    ///   Returned when the two arrays differ in shape.
    pub fn new(value: ArrayD<f64>, tangent: ArrayD<f64>) -> EngineResult<Self> {
        if value.shape() != tangent.shape() {
            return Err(EngineError::TangentShapeMismatch {
                value: value.shape().to_vec(),
                tangent: tangent.shape().to_vec(),
            });
        }
        Ok(Self { value, tangent })
    }

    /// The input being differentiated against: tangent of ones.
    pub fn variable(value: ArrayD<f64>) -> Self {
        let tangent = value.mapv(|_| 1.0);
        Self { value, tangent }
    }

    /// An input that carries no gradient.
    pub fn constant(value: ArrayD<f64>) -> Self {
        let tangent = value.mapv(|_| 0.0);
        Self { value, tangent }
    }

    pub fn value(&self) -> &ArrayD<f64> {
        &self.value
    }

    /// Recorded gradient, element by element.
    pub fn tangent(&self) -> &ArrayD<f64> {
        &self.tangent
    }

    pub fn into_parts(self) -> (ArrayD<f64>, ArrayD<f64>) {
        (self.value, self.tangent)
    }

    // Elementwise map with derivative `deriv(v)` evaluated at the input.
    fn unary<F, D>(&self, f: F, deriv: D) -> Self
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let value = self.value.mapv(&f);
        let tangent = Zip::from(&self.tangent)
            .and(&self.value)
            .map_collect(|&t, &v| kernels::chain(t, deriv(v)));
        Self { value, tangent }
    }

    // Piecewise-constant kernels: derivative zero almost everywhere.
    fn flat<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self { value: self.value.mapv(f), tangent: self.value.mapv(|_| 0.0) }
    }
}

// Broadcast two arrays to their common shape.
//
// Panics (through ndarray) when the shapes cannot be co-broadcast.
fn aligned(x: &ArrayD<f64>, y: &ArrayD<f64>) -> (ArrayD<f64>, ArrayD<f64>) {
    (x + &y.mapv(|_| 0.0), y + &x.mapv(|_| 0.0))
}

impl Expr for Dual {
    fn add(&self, other: &Self) -> Self {
        Self { value: &self.value + &other.value, tangent: &self.tangent + &other.tangent }
    }

    fn sub(&self, other: &Self) -> Self {
        Self { value: &self.value - &other.value, tangent: &self.tangent - &other.tangent }
    }

    fn mul(&self, other: &Self) -> Self {
        let (a, b) = aligned(&self.value, &other.value);
        let (da, db) = aligned(&self.tangent, &other.tangent);
        let tangent = Zip::from(&a)
            .and(&b)
            .and(&da)
            .and(&db)
            .map_collect(|&a, &b, &da, &db| kernels::chain(da, b) + kernels::chain(db, a));
        Self { value: &a * &b, tangent }
    }

    fn div(&self, other: &Self) -> Self {
        let (a, b) = aligned(&self.value, &other.value);
        let (da, db) = aligned(&self.tangent, &other.tangent);
        // d(a/b) = da / b - a db / b^2
        let tangent = Zip::from(&a).and(&b).and(&da).and(&db).map_collect(|&a, &b, &da, &db| {
            kernels::chain(da, 1.0 / b) - kernels::chain(db, a / (b * b))
        });
        Self { value: &a / &b, tangent }
    }

    fn neg(&self) -> Self {
        Self { value: self.value.mapv(|v| -v), tangent: self.tangent.mapv(|t| -t) }
    }

    fn scale(&self, k: f64) -> Self {
        Self { value: self.value.mapv(|v| k * v), tangent: self.tangent.mapv(|t| k * t) }
    }

    fn offset(&self, k: f64) -> Self {
        Self { value: self.value.mapv(|v| v + k), tangent: self.tangent.clone() }
    }

    fn div_scalar(&self, k: f64) -> Self {
        Self { value: self.value.mapv(|v| v / k), tangent: self.tangent.mapv(|t| t / k) }
    }

    fn floor(&self) -> Self {
        self.flat(f64::floor)
    }

    fn ceil(&self) -> Self {
        self.flat(f64::ceil)
    }

    fn round(&self) -> Self {
        self.flat(kernels::round)
    }

    fn ln(&self) -> Self {
        self.unary(f64::ln, kernels::ln_deriv)
    }

    fn exp(&self) -> Self {
        self.unary(f64::exp, f64::exp)
    }

    fn tanh(&self) -> Self {
        self.unary(f64::tanh, kernels::tanh_deriv)
    }

    fn sigmoid(&self) -> Self {
        self.unary(kernels::sigmoid, kernels::sigmoid_deriv)
    }

    fn step(&self) -> Self {
        self.flat(kernels::step)
    }

    fn clamp_min(&self, lo: f64) -> Self {
        self.unary(|v| kernels::clamp_min(v, lo), |v| kernels::clamp_min_deriv(v, lo))
    }

    fn clamp_max(&self, hi: f64) -> Self {
        self.unary(|v| kernels::clamp_max(v, hi), |v| kernels::clamp_max_deriv(v, hi))
    }

    fn detach(&self) -> Self {
        Self { value: self.value.clone(), tangent: self.value.mapv(|_| 0.0) }
    }

    fn override_grad(hard: &Self, soft: &Self) -> Self {
        // Broadcast by adding -0.0, which leaves every float unchanged.
        let value = &hard.value + &soft.value.mapv(|_| -0.0);
        let tangent = &soft.tangent + &hard.value.mapv(|_| -0.0);
        Self { value, tangent }
    }
}
