//! Runner that fits a comparison level with `argmin`'s Landweber iteration
//! and returns a [`CalibrationOutcome`].
use std::{cell::Cell, rc::Rc};

use argmin::{
    core::{Error, Executor, Gradient, State},
    solver::landweber::Landweber,
};
use ndarray::{Array1, array};

use crate::calibration::{
    errors::{CalibError, CalibResult},
    options::CalibrationOptions,
    problem::{Cost, Grad, LevelProblem, Theta},
};

/// Result of a level fit.
///
/// - `level`: fitted level `c`, the iterate with the lowest loss.
/// - `loss`: mean squared error of the configured rule at `c` (the hard
///   loss under the default straight-through configuration).
/// - `accuracy`: share of observations whose hard prediction equals the
///   label.
/// - `iterations`: gradient steps taken.
/// - `status`: human-readable termination status.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOutcome {
    pub level: f64,
    pub loss: f64,
    pub accuracy: f64,
    pub iterations: u64,
    pub status: String,
}

/// Fit the level `c` of `gt(price, c)` to binary labels.
///
/// Runs `max_iter` fixed steps `c ← c - step_size · dL/dc` where
/// `L(c) = mean((gt(price_i, c) - label_i)^2)` and the derivative is recorded
/// through the soft operators. With the default configuration the forward
/// prediction is the hard step and the gradient the sigmoid's, so the level
/// moves even though the hard loss is flat between prices.
///
/// The returned level is the lowest-loss point among `level0`, every
/// iterate and the final one (ties go to the later point), so the reported
/// loss never exceeds the loss at `level0`. Landing inside the gap between
/// the two label classes needs `step_size` small relative to that gap: a
/// step larger than the gap can jump over it into the region where the
/// sigmoid is flat, and the run then ends with a non-zero loss.
///
/// # Feature flags
/// If the `obs_slog` feature is enabled and `opts.verbose == true`, a terminal
/// slog observer is attached with `ObserverMode::Always`. With `verbose` set,
/// the initial loss and slope are printed to stderr before the first step.
///
/// # Errors
/// - Data validation errors from [`LevelProblem::new`].
/// - `CalibError::InvalidLevel` if `level0` or the final iterate is not
///   finite (or not positive in percent mode).
/// - Cost or gradient failures raised during iteration, and any `argmin`
///   runtime error, via `From<argmin::core::Error>`.
pub fn calibrate_level(
    prices: &Array1<f64>, labels: &Array1<f64>, level0: f64, opts: &CalibrationOptions,
) -> CalibResult<CalibrationOutcome> {
    let problem = LevelProblem::new(prices, labels, opts.compare.clone())?;
    let theta0 = array![level0];
    problem.level(&theta0)?;
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }

    let best = BestLevel::default();
    let tracked = TrackedProblem { problem: problem.clone(), best: best.clone() };
    let solver = Landweber::new(opts.step_size);
    #[cfg_attr(not(feature = "obs_slog"), allow(unused_mut))]
    let mut optimizer = Executor::new(tracked, solver)
        .configure(|state| state.param(theta0).max_iters(opts.max_iter));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let status = format!("{:?}", result.get_termination_status());
    let theta_last = result.take_best_param().ok_or(CalibError::MissingLevel)?;
    let (loss_last, _) = problem.evaluate(&theta_last)?;
    best.offer(loss_last, theta_last[0]);

    let (loss, level) = best.get().ok_or(CalibError::MissingLevel)?;
    Ok(CalibrationOutcome { level, loss, accuracy: problem.accuracy(level), iterations, status })
}

// ---- Helper Methods ----

fn log_initial_state(theta0: &Array1<f64>, problem: &LevelProblem<'_>) -> CalibResult<()> {
    let (loss, slope) = problem.evaluate(theta0)?;
    eprintln!("init: level = {:.6}, loss = {:.6}, dL/dc = {:.6}", theta0[0], loss, slope);
    Ok(())
}

/// Lowest loss seen so far and the level that produced it.
#[derive(Debug, Clone, Default)]
struct BestLevel(Rc<Cell<Option<(Cost, f64)>>>);

impl BestLevel {
    fn offer(&self, loss: Cost, level: f64) {
        match self.0.get() {
            Some((best, _)) if loss > best => {}
            _ => self.0.set(Some((loss, level))),
        }
    }

    fn get(&self) -> Option<(Cost, f64)> {
        self.0.get()
    }
}

/// [`LevelProblem`] that reports the loss of every point the solver visits.
///
/// Landweber only asks for gradients, so argmin never sees a cost and its
/// best parameter is always the last iterate.
#[derive(Debug, Clone)]
struct TrackedProblem<'a> {
    problem: LevelProblem<'a>,
    best: BestLevel,
}

impl Gradient for TrackedProblem<'_> {
    type Param = Theta;
    type Gradient = Grad;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let (loss, grad) = self.problem.loss_and_gradient(theta)?;
        self.best.offer(loss, theta[0]);
        Ok(grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calibration::options::DEFAULT_MAX_ITER,
        softops::{CompareOptions, ThresholdOptions},
    };
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Convergence of the straight-through fit into the gap between the two
    //   label classes from starts on either side.
    // - The inverted rule (levels swapped).
    // - A gap narrower than the default step: the run keeps its lowest-loss
    //   point, and a smaller step lands inside the gap.
    // - Rejection of an invalid starting level.
    // -------------------------------------------------------------------------

    fn data() -> (Array1<f64>, Array1<f64>) {
        let p = Array1::range(90.0, 111.0, 1.0);
        let y = p.mapv(|v| if v > 100.5 { 1.0 } else { 0.0 });
        (p, y)
    }

    #[test]
    // Purpose
    // -------
    // The level lands between 100 and 101 with zero hard loss.
    //
    // Given
    // -----
    // - prices 90..=110, labels price > 100.5, defaults (step 50, 300
    //   iterations, percent mode, softness 1).
    // - Starts 92, 95, 105 and 108.
    //
    // Expect
    // ------
    // - 100 < level < 101, loss 0, accuracy 1, 300 iterations.
    fn fit_lands_in_the_class_gap() {
        // Arrange
        let (p, y) = data();
        let opts = CalibrationOptions::default();

        for start in [92.0, 95.0, 105.0, 108.0] {
            // Act
            let out = calibrate_level(&p, &y, start, &opts).unwrap();

            // Assert
            assert!(out.level > 100.0 && out.level < 101.0, "start {start}: level {}", out.level);
            assert_eq!(out.loss, 0.0);
            assert_relative_eq!(out.accuracy, 1.0);
            assert_eq!(out.iterations, DEFAULT_MAX_ITER);
        }
    }

    #[test]
    // Purpose
    // -------
    // Swapped levels fit the rule "label = price <= c".
    //
    // Given
    // -----
    // - Labels inverted; comparison levels (1, 0); start 95.
    //
    // Expect
    // ------
    // - Level in (100, 101) with accuracy 1.
    fn inverted_rule_fits_too() {
        // Arrange
        let (p, y) = data();
        let y = y.mapv(|v| 1.0 - v);
        let cmp = CompareOptions::new(ThresholdOptions::default().swapped(), true);
        let opts = CalibrationOptions::new(cmp, 50.0, 300, false).unwrap();

        // Act
        let out = calibrate_level(&p, &y, 95.0, &opts).unwrap();

        // Assert
        assert!(out.level > 100.0 && out.level < 101.0);
        assert_relative_eq!(out.accuracy, 1.0);
    }

    fn narrow_gap() -> (Array1<f64>, Array1<f64>) {
        (array![100.0, 100.1, 100.2, 100.3], array![0.0, 0.0, 1.0, 1.0])
    }

    #[test]
    // Purpose
    // -------
    // A step small relative to the gap settles inside it.
    //
    // Given
    // -----
    // - Classes separated by (100.1, 100.2), step size 10, 300 iterations.
    // - Starts 95, 99 and 105.
    //
    // Expect
    // ------
    // - 100.1 <= level < 100.2, loss 0, accuracy 1.
    fn small_step_lands_in_a_narrow_gap() {
        // Arrange
        let (p, y) = narrow_gap();
        let opts = CalibrationOptions::new(CompareOptions::default(), 10.0, 300, false).unwrap();

        for start in [95.0, 99.0, 105.0] {
            // Act
            let out = calibrate_level(&p, &y, start, &opts).unwrap();

            // Assert
            assert!(out.level >= 100.1 && out.level < 100.2, "start {start}: level {}", out.level);
            assert_eq!(out.loss, 0.0);
            assert_relative_eq!(out.accuracy, 1.0);
        }
    }

    #[test]
    // Purpose
    // -------
    // When the step jumps over the gap, the reported point is still the best
    // one visited rather than wherever the iteration stalled.
    //
    // Given
    // -----
    // - The narrow gap, start 95 (loss 0.5 there).
    // - Default step 50, and step 20 which passes a point with loss 0.25
    //   before drifting off.
    //
    // Expect
    // ------
    // - Ok results whose loss never exceeds the starting loss.
    // - Step 20 reports loss at most 0.25.
    // - Accuracy is `1 - loss` (hard 0/1 predictions), and the loss matches a
    //   fresh evaluation at the reported level.
    fn overshooting_step_reports_the_best_point_visited() {
        // Arrange
        let (p, y) = narrow_gap();
        let problem = LevelProblem::new(&p, &y, CompareOptions::default()).unwrap();
        let (start_loss, _) = problem.evaluate(&array![95.0]).unwrap();
        let wide = CalibrationOptions::default();
        let medium = CalibrationOptions::new(CompareOptions::default(), 20.0, 300, false).unwrap();

        // Act
        let out_wide = calibrate_level(&p, &y, 95.0, &wide).unwrap();
        let out_medium = calibrate_level(&p, &y, 95.0, &medium).unwrap();

        // Assert
        assert_relative_eq!(start_loss, 0.5);
        for out in [&out_wide, &out_medium] {
            assert!(out.loss <= start_loss);
            assert_relative_eq!(out.accuracy, 1.0 - out.loss);
            assert_eq!(problem.evaluate(&array![out.level]).unwrap().0, out.loss);
        }
        assert!(out_medium.loss <= 0.25, "loss {}", out_medium.loss);
    }

    #[test]
    fn rejects_invalid_start() {
        let (p, y) = data();
        let opts = CalibrationOptions::default();

        assert!(matches!(
            calibrate_level(&p, &y, -5.0, &opts),
            Err(CalibError::InvalidLevel { .. })
        ));
        assert!(matches!(
            calibrate_level(&p, &y, f64::NAN, &opts),
            Err(CalibError::InvalidLevel { .. })
        ));
    }
}
