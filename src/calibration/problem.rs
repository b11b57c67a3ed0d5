//! calibration::problem — the level-fitting objective as an `argmin`
//! problem.
//!
//! Purpose
//! -------
//! Expose the squared error of a soft `gt(price, c)` rule against binary
//! labels as a one-parameter cost with a gradient recorded through the
//! straight-through operators.
//!
//! Key behaviors
//! -------------
//! - `cost(θ) = mean((gt(price_i, c) - label_i)^2)` with `c = θ[0]`.
//! - `gradient(θ)` seeds `c` as a [`Dual`] variable and averages
//!   `2 (pred_i - label_i) * d pred_i / d c`. With the default
//!   configuration the prediction is the hard step while the gradient is the
//!   sigmoid's, so the cost is piecewise constant yet the gradient is not.
//! - [`LevelProblem::surrogate`] switches the forward branch to the smooth
//!   curve, giving a differentiable cost whose finite differences match the
//!   recorded gradient.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are validated once in [`LevelProblem::new`]: same non-zero
//!   length, finite prices (positive in percent mode), labels in {0, 1}.
//! - θ has length 1 and `c` must be finite (and positive in percent mode);
//!   violations are returned as [`CalibError`] boxed into argmin's error.
use argmin::core::{CostFunction, Error, Gradient};
use ndarray::{Array1, ArrayD, arr0};

use crate::{
    calibration::errors::{CalibError, CalibResult},
    engine::Dual,
    softops::compare::{CompareOptions, gt},
};

/// Parameter vector `[c]`.
pub type Theta = Array1<f64>;
/// Gradient `[dL/dc]`.
pub type Grad = Array1<f64>;
/// Scalar cost.
pub type Cost = f64;

/// LevelProblem — prices, labels and the comparison rule being fitted.
///
/// Fields
/// ------
/// - `prices`: observations compared to the level.
/// - `labels`: target outcome of `price > level`, one per price.
/// - `compare`: comparison configuration (levels, softness, branches).
#[derive(Debug, Clone)]
pub struct LevelProblem<'a> {
    prices: &'a Array1<f64>,
    labels: &'a Array1<f64>,
    compare: CompareOptions,
}

impl<'a> LevelProblem<'a> {
    /// Validate the data and build the problem.
    ///
    /// Errors
    /// ------
    /// - `CalibError::EmptyInput`, `CalibError::LengthMismatch`
    /// - `CalibError::InvalidPrice`
    ///   Non-finite price, or non-positive price when `compare.percent`.
    /// - `CalibError::InvalidLabel`
    ///   Label other than 0 or 1.
    pub fn new(
        prices: &'a Array1<f64>, labels: &'a Array1<f64>, compare: CompareOptions,
    ) -> CalibResult<Self> {
        validate_data(prices, labels, compare.percent)?;
        Ok(Self { prices, labels, compare })
    }

    /// Same data and rule, with the smooth curve used forward.
    pub fn surrogate(&self) -> Self {
        let mut compare = self.compare.clone();
        compare.threshold.soft_value = true;
        Self { prices: self.prices, labels: self.labels, compare }
    }

    pub fn compare(&self) -> &CompareOptions {
        &self.compare
    }

    /// Loss and its derivative w.r.t. the level.
    ///
    /// Errors
    /// ------
    /// - `CalibError::ThetaLengthMismatch`, `CalibError::InvalidLevel`
    pub fn evaluate(&self, theta: &Theta) -> CalibResult<(Cost, f64)> {
        let level = self.level(theta)?;
        let pred = self.predict(&Dual::variable(arr0(level).into_dyn()));
        let residual = pred.value() - &self.labels.view().into_dyn();
        let n = residual.len() as f64;

        let loss = residual.mapv(|r| r * r).sum() / n;
        let slope = (&residual * pred.tangent()).sum() * 2.0 / n;
        Ok((loss, slope))
    }

    /// Smooth surrogate cost: same rule with `soft_value = true`.
    pub fn soft_cost(&self, theta: &Theta) -> CalibResult<Cost> {
        Ok(self.surrogate().evaluate(theta)?.0)
    }

    /// Share of observations whose hard prediction equals the label.
    pub fn accuracy(&self, level: f64) -> f64 {
        let mut hard = self.compare.clone();
        hard.threshold.soft_value = false;
        let prices: ArrayD<f64> = self.prices.clone().into_dyn();
        let pred = gt(&prices, &arr0(level).into_dyn(), &hard);
        let hits = pred.iter().zip(self.labels.iter()).filter(|&(p, l)| p == l).count();
        hits as f64 / self.labels.len() as f64
    }

    fn predict(&self, level: &Dual) -> Dual {
        let prices = Dual::constant(self.prices.clone().into_dyn());
        gt(&prices, level, &self.compare)
    }

    /// Loss together with the gradient vector `[dL/dc]`.
    ///
    /// Errors
    /// ------
    /// - As [`LevelProblem::evaluate`], plus `CalibError::InvalidGradient`
    ///   for a non-finite slope.
    pub(crate) fn loss_and_gradient(&self, theta: &Theta) -> CalibResult<(Cost, Grad)> {
        let (loss, slope) = self.evaluate(theta)?;
        if !slope.is_finite() {
            return Err(CalibError::InvalidGradient {
                index: 0,
                value: slope,
                reason: "Gradient elements must be finite.",
            });
        }
        Ok((loss, Array1::from_elem(1, slope)))
    }

    /// Validated level `c = θ[0]`.
    pub(crate) fn level(&self, theta: &Theta) -> CalibResult<f64> {
        if theta.len() != 1 {
            return Err(CalibError::ThetaLengthMismatch { expected: 1, actual: theta.len() });
        }
        let value = theta[0];
        if !value.is_finite() {
            return Err(CalibError::InvalidLevel { value, reason: "Level must be finite." });
        }
        if self.compare.percent && value <= 0.0 {
            return Err(CalibError::InvalidLevel {
                value,
                reason: "Level must be positive in percent mode.",
            });
        }
        Ok(value)
    }
}

impl CostFunction for LevelProblem<'_> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let (loss, _) = self.evaluate(theta)?;
        if !loss.is_finite() {
            return Err((CalibError::NonFiniteCost { value: loss }).into());
        }
        Ok(loss)
    }
}

impl Gradient for LevelProblem<'_> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let (_, grad) = self.loss_and_gradient(theta)?;
        Ok(grad)
    }
}

fn validate_data(prices: &Array1<f64>, labels: &Array1<f64>, percent: bool) -> CalibResult<()> {
    if prices.is_empty() || labels.is_empty() {
        return Err(CalibError::EmptyInput);
    }
    if prices.len() != labels.len() {
        return Err(CalibError::LengthMismatch { prices: prices.len(), labels: labels.len() });
    }
    for (index, &value) in prices.iter().enumerate() {
        if !value.is_finite() {
            return Err(CalibError::InvalidPrice { index, value, reason: "Prices must be finite." });
        }
        if percent && value <= 0.0 {
            return Err(CalibError::InvalidPrice {
                index,
                value,
                reason: "Prices must be positive in percent mode.",
            });
        }
    }
    for (index, &value) in labels.iter().enumerate() {
        if value != 0.0 && value != 1.0 {
            return Err(CalibError::InvalidLabel { index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Data validation in `LevelProblem::new`.
    // - Straight-through cost and gradient against closed forms.
    // - Level validation surfacing through argmin's error type.
    // - Hard accuracy.
    // -------------------------------------------------------------------------

    fn prices() -> Array1<f64> {
        Array1::range(90.0, 111.0, 1.0)
    }

    fn labels() -> Array1<f64> {
        prices().mapv(|p| if p > 100.5 { 1.0 } else { 0.0 })
    }

    #[test]
    // Purpose
    // -------
    // Invalid data is rejected before any solver runs.
    //
    // Given
    // -----
    // - Empty inputs, mismatched lengths, a zero price in percent mode and a
    //   label of 0.5.
    //
    // Expect
    // ------
    // - The matching `CalibError` variants.
    fn rejects_invalid_data() {
        let empty = Array1::<f64>::zeros(0);
        let p = array![1.0, 2.0];
        let cmp = CompareOptions::default();

        assert_eq!(LevelProblem::new(&empty, &empty, cmp.clone()).unwrap_err(), CalibError::EmptyInput);
        assert_eq!(
            LevelProblem::new(&p, &array![1.0], cmp.clone()).unwrap_err(),
            CalibError::LengthMismatch { prices: 2, labels: 1 }
        );
        assert!(matches!(
            LevelProblem::new(&array![0.0, 2.0], &array![0.0, 1.0], cmp.clone()),
            Err(CalibError::InvalidPrice { index: 0, .. })
        ));
        assert_eq!(
            LevelProblem::new(&p, &array![0.0, 0.5], cmp.clone()).unwrap_err(),
            CalibError::InvalidLabel { index: 1, value: 0.5 }
        );
        // Absolute mode accepts non-positive prices.
        let abs = cmp.with_percent(false);
        assert!(LevelProblem::new(&array![-1.0, 0.0], &array![0.0, 1.0], abs).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // The straight-through gradient matches its closed form.
    //
    // Given
    // -----
    // - prices 90..=110, labels price > 100.5, level c = 95.
    //
    // Expect
    // ------
    // - loss = share of misclassified prices (96..=100 are predicted 1).
    // - dL/dc = mean(2 (h_i - y_i) * (-q_i (1 - q_i) * 100 / c)) with
    //   q_i = s(100 ln(p_i / c)).
    fn straight_through_cost_and_gradient() {
        // Arrange
        let (p, y) = (prices(), labels());
        let problem = LevelProblem::new(&p, &y, CompareOptions::default()).unwrap();
        let c = 95.0;

        // Act
        let (loss, slope) = problem.evaluate(&array![c]).unwrap();

        // Assert
        let mut expected = 0.0;
        for (&pi, &yi) in p.iter().zip(y.iter()) {
            let h = if pi > c { 1.0 } else { 0.0 };
            let q = 1.0 / (1.0 + (-100.0 * (pi / c).ln()).exp());
            expected += 2.0 * (h - yi) * (-q * (1.0 - q) * 100.0 / c);
        }
        expected /= p.len() as f64;
        assert_relative_eq!(loss, 5.0 / 21.0, epsilon = 1e-15);
        assert_relative_eq!(slope, expected, max_relative = 1e-10);
        assert!(slope < 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Bad parameters surface as `CalibError` through argmin's error type.
    //
    // Given
    // -----
    // - θ = [] and θ = [-1] in percent mode.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch` and `InvalidLevel` after conversion.
    fn parameter_errors_surface_through_argmin() {
        // Arrange
        let (p, y) = (prices(), labels());
        let problem = LevelProblem::new(&p, &y, CompareOptions::default()).unwrap();

        // Act
        let empty = problem.cost(&Array1::zeros(0)).unwrap_err();
        let negative = problem.gradient(&array![-1.0]).unwrap_err();

        // Assert
        assert_eq!(
            CalibError::from(empty),
            CalibError::ThetaLengthMismatch { expected: 1, actual: 0 }
        );
        assert!(matches!(CalibError::from(negative), CalibError::InvalidLevel { value, .. } if value == -1.0));
    }

    #[test]
    fn accuracy_counts_hard_hits() {
        let (p, y) = (prices(), labels());
        let problem = LevelProblem::new(&p, &y, CompareOptions::default()).unwrap();

        assert_relative_eq!(problem.accuracy(100.7), 1.0);
        assert_relative_eq!(problem.accuracy(95.0), 16.0 / 21.0);
    }
}
