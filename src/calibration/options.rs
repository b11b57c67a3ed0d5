//! calibration::options — validated configuration of a level fit.
use crate::{
    calibration::errors::{CalibError, CalibResult},
    softops::{compare::CompareOptions, threshold::verify_softness},
};

/// Default Landweber step for levels of order 100 in percent mode.
pub const DEFAULT_STEP_SIZE: f64 = 50.0;
/// Default number of gradient steps.
pub const DEFAULT_MAX_ITER: u64 = 300;

/// CalibrationOptions — how to fit the level of a soft `gt(price, level)`
/// rule.
///
/// Fields
/// ------
/// - `compare`: `CompareOptions`
///   Comparison used as the model. Its levels must be `(0, 1)` or `(1, 0)`
///   so predictions live on the label set. Default: straight-through,
///   percent mode, softness 1.
/// - `step_size`: `f64`
///   Landweber step `ω` in `c ← c - ω ∇L(c)`. Default `50`.
/// - `max_iter`: `u64`
///   Number of gradient steps. Default `300`.
/// - `verbose`: `bool`
///   Print the initial cost and attach a terminal observer (feature
///   `obs_slog`). Default `false`.
///
/// Notes
/// -----
/// - In percent mode the gradient scales like `1 / level`, so the default
///   step suits levels of order 100. Rescale `step_size` with the data.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOptions {
    pub compare: CompareOptions,
    pub step_size: f64,
    pub max_iter: u64,
    pub verbose: bool,
}

impl CalibrationOptions {
    /// Errors
    /// ------
    /// - `CalibError::InvalidSoftness`
    ///   The comparison softness is non-finite or `<= 0`.
    /// - `CalibError::InvalidLevels`
    ///   The comparison levels are not `(0, 1)` or `(1, 0)`.
    /// - `CalibError::InvalidStepSize`
    ///   `step_size` is non-finite or `<= 0`.
    /// - `CalibError::InvalidMaxIter`
    ///   `max_iter == 0`.
    pub fn new(
        compare: CompareOptions, step_size: f64, max_iter: u64, verbose: bool,
    ) -> CalibResult<Self> {
        verify_softness(compare.threshold.softness)?;
        verify_levels(compare.threshold.ym, compare.threshold.yp)?;
        verify_step_size(step_size)?;
        if max_iter == 0 {
            return Err(CalibError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { compare, step_size, max_iter, verbose })
    }
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            compare: CompareOptions::default(),
            step_size: DEFAULT_STEP_SIZE,
            max_iter: DEFAULT_MAX_ITER,
            verbose: false,
        }
    }
}

fn verify_step_size(step_size: f64) -> CalibResult<()> {
    if !step_size.is_finite() {
        return Err(CalibError::InvalidStepSize {
            value: step_size,
            reason: "Step size must be finite.",
        });
    }
    if step_size <= 0.0 {
        return Err(CalibError::InvalidStepSize {
            value: step_size,
            reason: "Step size must be positive.",
        });
    }
    Ok(())
}

fn verify_levels(ym: f64, yp: f64) -> CalibResult<()> {
    let unit = (ym == 0.0 && yp == 1.0) || (ym == 1.0 && yp == 0.0);
    if !unit {
        return Err(CalibError::InvalidLevels { ym, yp });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The constructor rejects each documented invalid configuration.
    //
    // Given
    // -----
    // - Zero step, NaN step, zero iterations, negative softness and levels
    //   (0, 2).
    //
    // Expect
    // ------
    // - The matching `CalibError` variant for each.
    fn rejects_invalid_configurations() {
        let cmp = CompareOptions::default();

        assert!(matches!(
            CalibrationOptions::new(cmp.clone(), 0.0, 10, false),
            Err(CalibError::InvalidStepSize { .. })
        ));
        assert!(matches!(
            CalibrationOptions::new(cmp.clone(), f64::NAN, 10, false),
            Err(CalibError::InvalidStepSize { .. })
        ));
        assert!(matches!(
            CalibrationOptions::new(cmp.clone(), 1.0, 0, false),
            Err(CalibError::InvalidMaxIter { max_iter: 0, .. })
        ));

        let mut soft = cmp.clone();
        soft.threshold.softness = -1.0;
        assert!(matches!(
            CalibrationOptions::new(soft, 1.0, 10, false),
            Err(CalibError::InvalidSoftness { .. })
        ));

        let mut levels = cmp.clone();
        levels.threshold.yp = 2.0;
        assert_eq!(
            CalibrationOptions::new(levels, 1.0, 10, false),
            Err(CalibError::InvalidLevels { ym: 0.0, yp: 2.0 })
        );
    }

    #[test]
    fn accepts_inverted_levels_and_defaults() {
        let inverted = CompareOptions::default();
        let inverted = CompareOptions::new(inverted.threshold.swapped(), true);
        assert!(CalibrationOptions::new(inverted, 10.0, 5, true).is_ok());

        let d = CalibrationOptions::default();
        assert_eq!(d.step_size, DEFAULT_STEP_SIZE);
        assert_eq!(d.max_iter, DEFAULT_MAX_ITER);
        assert!(d.compare.percent);
    }
}
