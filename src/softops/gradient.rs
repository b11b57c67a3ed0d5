//! softops::gradient — the straight-through override every soft operator
//! is built on.
use crate::engine::Expr;

/// Evaluate as `hard`, differentiate as `soft`.
///
/// Parameters
/// ----------
/// - `hard`: `&E`
///   Expression whose forward value is returned exactly.
/// - `soft`: `&E`
///   Surrogate whose gradient replaces the gradient of `hard`.
///
/// Returns
/// -------
/// `E`
///   An expression of the broadcast shape of `hard` and `soft`. Its value is
///   `hard`; any gradient computed through it equals the gradient through
///   `soft` alone, whatever the value of `hard`.
///
/// Panics
/// ------
/// - When `hard` and `soft` cannot be broadcast together.
///
/// Notes
/// -----
/// - Hosts without a dedicated implementation fall back to
///   `soft + detach(hard - soft)`.
pub fn with_grad<E: Expr>(hard: &E, soft: &E) -> E {
    E::override_grad(hard, soft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Dual;
    use ndarray::{arr0, arr1};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact forward value of the override on eager and recording hosts.
    // - Gradient taken from the surrogate only, independent of `hard`.
    //
    // They intentionally DO NOT cover:
    // - The default `soft + detach(hard - soft)` body; see `engine::expr`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Forward value equals `hard` bit-for-bit, even when `soft` is far away.
    //
    // Given
    // -----
    // - hard = [0.1, 1e16 + 1.0], soft = [1e16, -3.0] on the eager array
    //   host and as `Dual` constants.
    //
    // Expect
    // ------
    // - Both hosts return `hard` exactly.
    fn forward_value_is_hard_exactly() {
        // Arrange
        let hard = arr1(&[0.1, 1e16 + 1.0]).into_dyn();
        let soft = arr1(&[1e16, -3.0]).into_dyn();

        // Act
        let eager = with_grad(&hard, &soft);
        let dual = with_grad(&Dual::constant(hard.clone()), &Dual::constant(soft));

        // Assert
        assert_eq!(eager, hard);
        assert_eq!(dual.value(), &hard);
        assert_eq!(with_grad(&0.25_f64, &-7.0), 0.25);
    }

    #[test]
    // Purpose
    // -------
    // The recorded gradient is the surrogate's, whatever the hard branch.
    //
    // Given
    // -----
    // - x = [0.5, 2.0] variable; hard = exp(x) (gradient e^x), soft = 3x
    //   (gradient 3), and a second hard branch 100 x^2.
    //
    // Expect
    // ------
    // - Tangent 3 everywhere for both hard branches.
    fn gradient_comes_from_soft_alone() {
        // Arrange
        let x = Dual::variable(arr1(&[0.5, 2.0]).into_dyn());
        let soft = x.scale(3.0);

        // Act
        let a = with_grad(&x.exp(), &soft);
        let b = with_grad(&x.mul(&x).scale(100.0), &soft);

        // Assert
        assert!(a.tangent().iter().all(|&t| t == 3.0));
        assert_eq!(a.tangent(), b.tangent());
    }

    #[test]
    // Purpose
    // -------
    // The result takes the broadcast shape of the pair.
    //
    // Given
    // -----
    // - A 0-d hard value and a length-3 soft surrogate.
    //
    // Expect
    // ------
    // - Length-3 output filled with the hard value.
    fn result_takes_broadcast_shape() {
        // Arrange
        let hard = arr0(2.0).into_dyn();
        let soft = arr1(&[0.0, 1.0, 2.0]).into_dyn();

        // Act
        let out = with_grad(&hard, &soft);

        // Assert
        assert_eq!(out, arr1(&[2.0, 2.0, 2.0]).into_dyn());
    }
}
