//! Condition numbers from singular values.
//!
//! `cond(M) = σ_max / σ_min`. A zero (or non-finite) smallest singular value
//! yields `f64::INFINITY`.

use nalgebra::DMatrix;

use crate::error::CalcError;
use crate::math::add_ridge;

pub fn condition_number(m: &DMatrix<f64>) -> Result<f64, CalcError> {
    if m.is_empty() {
        return Err(CalcError::InsufficientData);
    }
    let sv = m.singular_values();
    let max = sv.max();
    let min = sv.min();
    if !(max.is_finite() && min.is_finite()) || min <= 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(max / min)
}

/// `cond(M + λI)`.
pub fn ridge_condition_number(m: &DMatrix<f64>, lambda: f64) -> Result<f64, CalcError> {
    let mut shifted = m.clone();
    add_ridge(&mut shifted, lambda);
    condition_number(&shifted)
}
