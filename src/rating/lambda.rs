//! Ridge strength (λ) selection.
//!
//! Three strategies are available, plus an explicit caller-supplied value:
//!
//! - **Band**: `0.1` below 20 matches, `0.01` up to 60, `0.001` above.
//! - **Continuous**: `clamp(0.5 / √n, 0.001, 0.3)`.
//! - **Auto**: start from the continuous value and double λ until
//!   `cond(AᵗA + λI)` drops to the target (1e7), giving up after 10 rounds or
//!   once λ reaches `max_lambda` (10.0).
//!
//! Failing to reach the target is not fatal: the last λ is still returned,
//! flagged `ill_conditioned`.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::LambdaStrategy;
use crate::error::CalcError;
use crate::math::{multiply, ridge_condition_number, transpose};

pub const DEFAULT_TARGET_CONDITION: f64 = 1e7;
pub const DEFAULT_MAX_LAMBDA: f64 = 10.0;
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

const CONTINUOUS_MIN: f64 = 0.001;
const CONTINUOUS_MAX: f64 = 0.3;

/// Limits for the condition-number driven search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoTune {
    pub target_condition: f64,
    pub max_lambda: f64,
    pub max_iterations: usize,
}

impl Default for AutoTune {
    fn default() -> Self {
        Self {
            target_condition: DEFAULT_TARGET_CONDITION,
            max_lambda: DEFAULT_MAX_LAMBDA,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// A λ-selection strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LambdaPolicy {
    /// Fixed λ; `0.0` means an unregularized solve.
    Explicit(f64),
    FixedBand,
    ContinuousHeuristic,
    AutoTunedBySvd(AutoTune),
}

impl Default for LambdaPolicy {
    fn default() -> Self {
        LambdaPolicy::AutoTunedBySvd(AutoTune::default())
    }
}

/// The chosen λ and how it was arrived at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaChoice {
    pub lambda: f64,
    pub strategy: LambdaStrategy,
    /// `cond(AᵗA + λI)` at the returned λ, when a design matrix was analysed.
    pub condition: Option<f64>,
    /// Doubling rounds run (auto-tuning only). Hitting the round limit adds
    /// one more condition check for the final λ, not counted here.
    pub iterations: usize,
    /// Auto-tuning ended without reaching the target condition number.
    pub ill_conditioned: bool,
}

impl LambdaChoice {
    fn heuristic(lambda: f64, strategy: LambdaStrategy) -> Self {
        Self {
            lambda,
            strategy,
            condition: None,
            iterations: 0,
            ill_conditioned: false,
        }
    }
}

impl LambdaPolicy {
    pub fn from_strategy(strategy: LambdaStrategy, explicit: f64) -> Self {
        match strategy {
            LambdaStrategy::Explicit => LambdaPolicy::Explicit(explicit),
            LambdaStrategy::Band => LambdaPolicy::FixedBand,
            LambdaStrategy::Continuous => LambdaPolicy::ContinuousHeuristic,
            LambdaStrategy::Auto => LambdaPolicy::AutoTunedBySvd(AutoTune::default()),
        }
    }

    pub fn strategy(&self) -> LambdaStrategy {
        match self {
            LambdaPolicy::Explicit(_) => LambdaStrategy::Explicit,
            LambdaPolicy::FixedBand => LambdaStrategy::Band,
            LambdaPolicy::ContinuousHeuristic => LambdaStrategy::Continuous,
            LambdaPolicy::AutoTunedBySvd(_) => LambdaStrategy::Auto,
        }
    }

    /// Choose λ for an event with `match_count` matches.
    ///
    /// `design` is the metric-independent alliance matrix `A`. Auto-tuning
    /// without one falls back to the continuous heuristic.
    pub fn choose_lambda(
        &self,
        match_count: usize,
        design: Option<&DMatrix<f64>>,
    ) -> Result<LambdaChoice, CalcError> {
        match *self {
            LambdaPolicy::Explicit(lambda) => {
                if !(lambda.is_finite() && lambda >= 0.0) {
                    return Err(CalcError::InvalidLambda { lambda });
                }
                Ok(LambdaChoice::heuristic(lambda, LambdaStrategy::Explicit))
            }
            LambdaPolicy::FixedBand => Ok(LambdaChoice::heuristic(
                band_lambda(match_count),
                LambdaStrategy::Band,
            )),
            LambdaPolicy::ContinuousHeuristic => Ok(LambdaChoice::heuristic(
                continuous_lambda(match_count),
                LambdaStrategy::Continuous,
            )),
            LambdaPolicy::AutoTunedBySvd(limits) => match design {
                Some(a) if !a.is_empty() => auto_tune_lambda(a, match_count, &limits),
                _ => {
                    log::debug!("No design matrix for auto-tuning; using continuous heuristic.");
                    Ok(LambdaChoice::heuristic(
                        continuous_lambda(match_count),
                        LambdaStrategy::Auto,
                    ))
                }
            },
        }
    }
}

/// Coarse λ keyed on match count.
pub fn band_lambda(match_count: usize) -> f64 {
    match match_count {
        0..20 => 0.1,
        20..=60 => 0.01,
        _ => 0.001,
    }
}

/// `clamp(0.5 / √n, 0.001, 0.3)`; an empty event gets the upper bound.
pub fn continuous_lambda(match_count: usize) -> f64 {
    if match_count == 0 {
        return CONTINUOUS_MAX;
    }
    (0.5 / (match_count as f64).sqrt()).clamp(CONTINUOUS_MIN, CONTINUOUS_MAX)
}

/// Smallest doubling of the continuous λ that brings `cond(AᵗA + λI)` under
/// the target.
pub fn auto_tune_lambda(
    design: &DMatrix<f64>,
    match_count: usize,
    limits: &AutoTune,
) -> Result<LambdaChoice, CalcError> {
    let ata = multiply(&transpose(design), design)?;

    let mut lambda = continuous_lambda(match_count).min(limits.max_lambda);
    let mut evaluated = f64::NAN;
    let mut iterations = 0;
    let mut condition = f64::INFINITY;

    for _ in 0..limits.max_iterations {
        iterations += 1;
        condition = ridge_condition_number(&ata, lambda)?;
        evaluated = lambda;
        if condition <= limits.target_condition {
            log::debug!("Auto-tuned lambda={lambda} (cond={condition:.3e}, iterations={iterations}).");
            return Ok(LambdaChoice {
                lambda,
                strategy: LambdaStrategy::Auto,
                condition: Some(condition),
                iterations,
                ill_conditioned: false,
            });
        }
        if lambda >= limits.max_lambda {
            break;
        }
        lambda = (lambda * 2.0).min(limits.max_lambda);
    }

    // Running out of iterations leaves the last doubling unevaluated.
    if evaluated != lambda {
        condition = ridge_condition_number(&ata, lambda)?;
    }
    let ill_conditioned = !(condition <= limits.target_condition);
    if ill_conditioned {
        log::warn!(
            "Lambda auto-tuning stopped at lambda={lambda} with cond={condition:.3e} (target {:.1e}).",
            limits.target_condition
        );
    }

    Ok(LambdaChoice {
        lambda,
        strategy: LambdaStrategy::Auto,
        condition: Some(condition),
        iterations,
        ill_conditioned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(band_lambda(0), 0.1);
        assert_eq!(band_lambda(19), 0.1);
        assert_eq!(band_lambda(20), 0.01);
        assert_eq!(band_lambda(60), 0.01);
        assert_eq!(band_lambda(61), 0.001);
    }

    #[test]
    fn continuous_is_clamped() {
        assert_eq!(continuous_lambda(1), 0.3);
        assert!((continuous_lambda(100) - 0.05).abs() < 1e-12);
        assert_eq!(continuous_lambda(1_000_000), 0.001);
        assert_eq!(continuous_lambda(0), 0.3);
    }

    #[test]
    fn well_conditioned_design_keeps_the_starting_lambda() {
        // Every team plays alone: AᵗA is the identity.
        let a = DMatrix::<f64>::identity(4, 4);
        let choice = LambdaPolicy::default().choose_lambda(100, Some(&a)).unwrap();
        assert_eq!(choice.lambda, continuous_lambda(100));
        assert_eq!(choice.iterations, 1);
        assert!(!choice.ill_conditioned);
    }

    #[test]
    fn ill_conditioned_design_doubles_lambda() {
        // Two teams that always play together: AᵗA is singular.
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let limits = AutoTune {
            target_condition: 10.0,
            ..AutoTune::default()
        };
        let choice = auto_tune_lambda(&a, 100, &limits).unwrap();

        // cond(AᵗA + λI) = (6 + λ) / λ <= 10  <=>  λ >= 2/3.
        assert!(choice.lambda >= 2.0 / 3.0);
        assert!(choice.lambda < 4.0 / 3.0);
        assert!(!choice.ill_conditioned);
        assert!(choice.iterations > 1);
    }

    #[test]
    fn unreachable_target_is_flagged_not_fatal() {
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let limits = AutoTune {
            target_condition: 1.0,
            ..AutoTune::default()
        };
        let choice = auto_tune_lambda(&a, 100, &limits).unwrap();
        assert!(choice.ill_conditioned);
        assert!(choice.lambda <= DEFAULT_MAX_LAMBDA);
        assert!(choice.iterations <= DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn running_out_of_rounds_is_flagged_and_rechecked() {
        // Starts at the continuous floor (0.001), so ten doublings never reach the cap.
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let limits = AutoTune {
            target_condition: 1.0,
            ..AutoTune::default()
        };
        let choice = auto_tune_lambda(&a, 1_000_000, &limits).unwrap();

        assert!(choice.ill_conditioned);
        assert_eq!(choice.iterations, DEFAULT_MAX_ITERATIONS);
        assert!((choice.lambda - 1.024).abs() < 1e-12);
        assert!(choice.lambda < DEFAULT_MAX_LAMBDA);

        // The reported condition belongs to the returned λ: (6 + λ) / λ.
        let expected = (6.0 + choice.lambda) / choice.lambda;
        let got = choice.condition.unwrap();
        assert!((got - expected).abs() < 1e-6 * expected, "{got} vs {expected}");
    }

    #[test]
    fn auto_without_design_uses_continuous_value() {
        let choice = LambdaPolicy::default().choose_lambda(25, None).unwrap();
        assert_eq!(choice.lambda, continuous_lambda(25));
        assert_eq!(choice.condition, None);
    }

    #[test]
    fn explicit_lambda_is_validated() {
        assert!(LambdaPolicy::Explicit(0.0).choose_lambda(5, None).is_ok());
        assert!(matches!(
            LambdaPolicy::Explicit(f64::NAN).choose_lambda(5, None),
            Err(CalcError::InvalidLambda { .. })
        ));
    }
}
