//! Dense matrix helpers.
//!
//! Rating systems are small (tens to low hundreds of teams), so everything is
//! stored densely in `nalgebra::DMatrix` with no sparsity special-casing.

use nalgebra::{DMatrix, DVector};

use crate::error::CalcError;

pub fn transpose(m: &DMatrix<f64>) -> DMatrix<f64> {
    m.transpose()
}

/// `a * b`, checking that the inner dimensions agree.
pub fn multiply(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>, CalcError> {
    if a.ncols() != b.nrows() {
        return Err(CalcError::DimensionMismatch {
            expected: a.ncols(),
            actual: b.nrows(),
        });
    }
    Ok(a * b)
}

/// `a * v`, checking that the inner dimensions agree.
pub fn multiply_vec(a: &DMatrix<f64>, v: &DVector<f64>) -> Result<DVector<f64>, CalcError> {
    if a.ncols() != v.len() {
        return Err(CalcError::DimensionMismatch {
            expected: a.ncols(),
            actual: v.len(),
        });
    }
    Ok(a * v)
}
