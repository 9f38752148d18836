//! Gauss-Jordan elimination with partial pivoting.
//!
//! At each pivot column the row with the largest-magnitude entry (at or below
//! the diagonal) is swapped into place before eliminating the column from every
//! other row. A pivot whose magnitude is below [`PIVOT_EPS`] means the system is
//! singular (or numerically so) and is reported as
//! [`CalcError::SingularSystem`]; we never divide by it.

use nalgebra::{DMatrix, DVector};

use crate::error::CalcError;

/// Smallest pivot magnitude accepted during elimination.
pub const PIVOT_EPS: f64 = 1e-14;

/// Solve the square system `a x = b`, consuming both operands.
pub fn gaussian_eliminate(mut a: DMatrix<f64>, mut b: DVector<f64>) -> Result<DVector<f64>, CalcError> {
    let n = a.nrows();
    if n == 0 {
        return Err(CalcError::InsufficientData);
    }
    if a.ncols() != n {
        return Err(CalcError::DimensionMismatch {
            expected: n,
            actual: a.ncols(),
        });
    }
    if b.len() != n {
        return Err(CalcError::DimensionMismatch {
            expected: n,
            actual: b.len(),
        });
    }

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_abs = a[(col, col)].abs();
        for row in (col + 1)..n {
            let v = a[(row, col)].abs();
            if v > pivot_abs {
                pivot_abs = v;
                pivot_row = row;
            }
        }

        // Written as a negated `>=` so a NaN pivot is also rejected.
        if !(pivot_abs >= PIVOT_EPS) {
            return Err(CalcError::SingularSystem {
                column: col,
                pivot: pivot_abs,
            });
        }

        if pivot_row != col {
            a.swap_rows(col, pivot_row);
            b.swap_rows(col, pivot_row);
        }

        let pivot = a[(col, col)];
        for j in col..n {
            a[(col, j)] /= pivot;
        }
        b[col] /= pivot;

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[(row, col)];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                let v = a[(col, j)];
                a[(row, j)] -= factor * v;
            }
            let rhs = b[col];
            b[row] -= factor * rhs;
        }
    }

    if b.iter().any(|v| !v.is_finite()) {
        return Err(CalcError::NonFiniteSolution);
    }
    Ok(b)
}
