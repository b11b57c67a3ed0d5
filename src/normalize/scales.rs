//! normalize::scales — percentage and log-percentage scales relative to a
//! reference value.
//!
//! Purpose
//! -------
//! Express a value relative to a reference `wrt` on a human-readable scale
//! and map it back. Both scales are exact algebraic inverses of their
//! normalizing map.
//!
//! Key behaviors
//! -------------
//! - [`Perc`]: `100 (v / wrt - 1)`; 2 with respect to 1 is `+100`.
//! - [`LogPerc`]: `100 ln(v / wrt)`; matches [`Perc`] to first order and is
//!   additive, so doubling is `+69.3` and halving `-69.3`.
//! - `wrt` (and `v` for [`LogPerc`]) is clamped below at `eps` before any
//!   division or logarithm, so zero references never produce NaN/Inf.
//!
//! Invariants & assumptions
//! ------------------------
//! - `eps` is finite and `> 0` for values built through `new`; the field is
//!   public and not re-checked on use.
//! - Round trips recover `v` within floating tolerance whenever `v > eps`
//!   and `wrt > eps`.
//!
//! Conventions
//! -----------
//! - Callers pass `wrt` explicitly; `1.0` reproduces a unit reference.
use crate::{
    engine::Expr,
    normalize::errors::{NormalizeError, NormalizeResult},
};

/// Lower clamp applied to references (and log-scale values) by default.
pub const DEFAULT_EPS: f64 = 1e-6;

/// A value/reference scale with an exact inverse.
pub trait Normalizer {
    /// Map `value` onto the scale relative to `wrt`.
    fn normalize<E: Expr>(&self, value: &E, wrt: &E) -> E;

    /// Inverse of [`Normalizer::normalize`].
    fn denormalize<E: Expr>(&self, normalized: &E, wrt: &E) -> E;
}

/// Percentage difference, `100 (v / wrt - 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perc {
    pub eps: f64,
}

/// Log-percentage difference, `100 ln(v / wrt)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogPerc {
    pub eps: f64,
}

impl Perc {
    /// Errors
    /// ------
    /// - `NormalizeError::InvalidEps`
    ///   `eps` is non-finite or `<= 0`.
    pub fn new(eps: f64) -> NormalizeResult<Self> {
        verify_eps(eps)?;
        Ok(Self { eps })
    }
}

impl LogPerc {
    /// Errors
    /// ------
    /// - `NormalizeError::InvalidEps`
    ///   `eps` is non-finite or `<= 0`.
    pub fn new(eps: f64) -> NormalizeResult<Self> {
        verify_eps(eps)?;
        Ok(Self { eps })
    }
}

impl Default for Perc {
    fn default() -> Self {
        Self { eps: DEFAULT_EPS }
    }
}

impl Default for LogPerc {
    fn default() -> Self {
        Self { eps: DEFAULT_EPS }
    }
}

impl Normalizer for Perc {
    fn normalize<E: Expr>(&self, value: &E, wrt: &E) -> E {
        value.div(&wrt.clamp_min(self.eps)).offset(-1.0).scale(100.0)
    }

    fn denormalize<E: Expr>(&self, normalized: &E, wrt: &E) -> E {
        normalized.div_scalar(100.0).offset(1.0).mul(&wrt.clamp_min(self.eps))
    }
}

impl Normalizer for LogPerc {
    fn normalize<E: Expr>(&self, value: &E, wrt: &E) -> E {
        value.clamp_min(self.eps).div(&wrt.clamp_min(self.eps)).ln().scale(100.0)
    }

    fn denormalize<E: Expr>(&self, normalized: &E, wrt: &E) -> E {
        normalized.div_scalar(100.0).exp().mul(&wrt.clamp_min(self.eps))
    }
}

/// Validate a clamp floor: finite and strictly positive.
///
/// # Errors
/// Returns [`NormalizeError::InvalidEps`] otherwise.
pub fn verify_eps(eps: f64) -> NormalizeResult<()> {
    if !eps.is_finite() {
        return Err(NormalizeError::InvalidEps { value: eps, reason: "eps must be finite." });
    }
    if eps <= 0.0 {
        return Err(NormalizeError::InvalidEps { value: eps, reason: "eps must be positive." });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Dual;
    use approx::assert_relative_eq;
    use ndarray::{arr0, arr1};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Known values of both scales.
    // - Inverse property for positive values and references.
    // - eps clamping at zero references and zero log-scale values.
    // - Gradients of the normalized value w.r.t. the input.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Reference values of both scales.
    //
    // Given
    // -----
    // - v = 2 and v = 0.5 with wrt = 1.
    //
    // Expect
    // ------
    // - Perc: +100 and -50. LogPerc: ±100 ln 2.
    fn known_values() {
        let p = Perc::default();
        let lp = LogPerc::default();

        assert_relative_eq!(p.normalize(&2.0_f64, &1.0), 100.0);
        assert_relative_eq!(p.normalize(&0.5_f64, &1.0), -50.0);
        assert_relative_eq!(lp.normalize(&2.0_f64, &1.0), 100.0 * 2.0_f64.ln());
        assert_relative_eq!(lp.normalize(&0.5_f64, &1.0), -100.0 * 2.0_f64.ln());
    }

    #[test]
    // Purpose
    // -------
    // denormalize inverts normalize for positive inputs.
    //
    // Given
    // -----
    // - v over several orders of magnitude against a reference 37.5.
    //
    // Expect
    // ------
    // - Round trip recovers v with relative error below 1e-9.
    fn round_trip_recovers_value() {
        // Arrange
        let v = arr1(&[1e-3, 0.7, 37.5, 120.0, 4.2e5]).into_dyn();
        let wrt = arr0(37.5).into_dyn();

        // Act
        let p = Perc::default();
        let lp = LogPerc::default();
        let back_p = p.denormalize(&p.normalize(&v, &wrt), &wrt);
        let back_lp = lp.denormalize(&lp.normalize(&v, &wrt), &wrt);

        // Assert
        for i in 0..v.len() {
            assert_relative_eq!(back_p[i], v[i], max_relative = 1e-9);
            assert_relative_eq!(back_lp[i], v[i], max_relative = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // Zero references and zero log-scale values are clamped to eps.
    //
    // Given
    // -----
    // - wrt = 0 for both scales; v = 0 for LogPerc; eps = 1e-3.
    //
    // Expect
    // ------
    // - Finite outputs equal to the eps-clamped formulas.
    fn zero_inputs_are_clamped_to_eps() {
        // Arrange
        let p = Perc::new(1e-3).unwrap();
        let lp = LogPerc::new(1e-3).unwrap();

        // Act
        let a = p.normalize(&2.0_f64, &0.0);
        let b = lp.normalize(&0.0_f64, &0.0);
        let c = lp.normalize(&1.0_f64, &0.0);
        let d = p.denormalize(&100.0_f64, &0.0);

        // Assert
        assert_relative_eq!(a, 100.0 * (2.0 / 1e-3 - 1.0));
        assert_eq!(b, 0.0);
        assert_relative_eq!(c, 100.0 * 1e3_f64.ln());
        assert_relative_eq!(d, 2e-3);
    }

    #[test]
    // Purpose
    // -------
    // Gradients flow through the normalized value.
    //
    // Given
    // -----
    // - v = [50, 200] variable, wrt = 100 constant.
    //
    // Expect
    // ------
    // - d Perc / d v = 100 / wrt = 1; d LogPerc / d v = 100 / v.
    fn gradients_wrt_value() {
        // Arrange
        let v = Dual::variable(arr1(&[50.0, 200.0]).into_dyn());
        let wrt = Dual::constant(arr0(100.0).into_dyn());

        // Act
        let p = Perc::default().normalize(&v, &wrt);
        let lp = LogPerc::default().normalize(&v, &wrt);

        // Assert
        assert_relative_eq!(p.tangent()[0], 1.0);
        assert_relative_eq!(p.tangent()[1], 1.0);
        assert_relative_eq!(lp.tangent()[0], 2.0);
        assert_relative_eq!(lp.tangent()[1], 0.5);
    }

    #[test]
    fn rejects_invalid_eps() {
        for bad in [0.0, -1e-6, f64::NAN, f64::INFINITY] {
            assert!(matches!(Perc::new(bad), Err(NormalizeError::InvalidEps { .. })));
            assert!(matches!(LogPerc::new(bad), Err(NormalizeError::InvalidEps { .. })));
        }
    }
}
