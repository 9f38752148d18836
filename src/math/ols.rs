//! Least squares via the normal equations.
//!
//! Every rating metric reduces to:
//!
//! ```text
//! minimize ‖A x - b‖² + λ ‖x‖²
//! ```
//!
//! where `A` is the 0/1 alliance design matrix. We form `AᵗA x = Aᵗb` (adding
//! `λ` to the diagonal when regularized) and hand it to Gauss-Jordan
//! elimination.
//!
//! Implementation notes:
//! - With `λ = 0` the system is only solvable when `AᵗA` is non-singular, i.e.
//!   there are enough independent alliance equations for the number of teams.
//!   A singular system is surfaced as an error, never as a zero vector.
//! - Any `λ > 0` makes `AᵗA + λI` positive definite, so the regularized solve
//!   always succeeds for finite inputs.

use nalgebra::{DMatrix, DVector};

use crate::error::CalcError;
use crate::math::{gaussian_eliminate, multiply, multiply_vec, transpose};

/// Form `(AᵗA, Aᵗb)`.
pub fn normal_equations(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<(DMatrix<f64>, DVector<f64>), CalcError> {
    if a.nrows() != b.len() {
        return Err(CalcError::DimensionMismatch {
            expected: a.nrows(),
            actual: b.len(),
        });
    }
    let at = transpose(a);
    let ata = multiply(&at, a)?;
    let atb = multiply_vec(&at, b)?;
    Ok((ata, atb))
}

/// Unregularized least squares solve.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, CalcError> {
    let (ata, atb) = normal_equations(a, b)?;
    gaussian_eliminate(ata, atb)
}

/// Ridge least squares solve with strength `lambda`.
pub fn solve_least_squares_regularized(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    lambda: f64,
) -> Result<DVector<f64>, CalcError> {
    if !(lambda.is_finite() && lambda >= 0.0) {
        return Err(CalcError::InvalidLambda { lambda });
    }
    let (mut ata, atb) = normal_equations(a, b)?;
    add_ridge(&mut ata, lambda);
    gaussian_eliminate(ata, atb)
}

/// Add `lambda` to every diagonal entry.
pub fn add_ridge(m: &mut DMatrix<f64>, lambda: f64) {
    let n = m.nrows().min(m.ncols());
    for i in 0..n {
        m[(i, i)] += lambda;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn ridge_shrinks_toward_zero() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let plain = solve_least_squares(&x, &y).unwrap();
        let ridge = solve_least_squares_regularized(&x, &y, 1.0).unwrap();
        assert!(ridge.norm() < plain.norm());
    }

    #[test]
    fn ridge_with_zero_lambda_matches_plain_solve() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let plain = solve_least_squares(&x, &y).unwrap();
        let ridge = solve_least_squares_regularized(&x, &y, 0.0).unwrap();
        assert!((plain - ridge).norm() < 1e-12);
    }

    #[test]
    fn underdetermined_system_needs_ridge() {
        // Two equations, three unknowns.
        let x = DMatrix::from_row_slice(2, 3, &[1.0, 1.0, 0.0, 0.0, 1.0, 1.0]);
        let y = DVector::from_row_slice(&[10.0, 6.0]);

        assert!(matches!(
            solve_least_squares(&x, &y),
            Err(CalcError::SingularSystem { .. })
        ));
        let beta = solve_least_squares_regularized(&x, &y, 0.1).unwrap();
        assert!(beta.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn negative_lambda_is_rejected() {
        let x = DMatrix::from_row_slice(1, 1, &[1.0]);
        let y = DVector::from_row_slice(&[1.0]);
        assert_eq!(
            solve_least_squares_regularized(&x, &y, -1.0).unwrap_err(),
            CalcError::InvalidLambda { lambda: -1.0 }
        );
    }
}
