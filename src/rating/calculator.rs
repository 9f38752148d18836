//! Per-team rating calculation.
//!
//! Given a set of matches, a team universe and a ridge strength λ, each
//! regression metric:
//! - selects its scoring function (see `metrics::alliance_target`)
//! - builds the alliance design system `(A, b, activeTeams)`
//! - solves the normal equations (ridge when `λ > 0`)
//! - zips the solution back onto the active teams
//!
//! The calculator holds no mutable state; every call is a pure function of
//! its configuration, so the five metrics can be solved in parallel.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::design::{DesignSystem, build_design, build_indicator, teams_from_matches};
use crate::domain::{FitQuality, Match, Metric, MetricFit, PerformanceResult, TeamId};
use crate::error::CalcError;
use crate::math::{multiply_vec, solve_least_squares, solve_least_squares_regularized};
use crate::metrics::{alliance_target, np_avg};
use crate::rating::lambda::{LambdaChoice, LambdaPolicy};

/// Matches, team universe and λ for one calculation.
#[derive(Debug, Clone)]
pub struct PerformanceCalculator {
    pub matches: Vec<Match>,
    pub teams: Vec<TeamId>,
    /// Ridge strength; exactly `0.0` selects the unregularized solve.
    pub lambda: f64,
}

impl PerformanceCalculator {
    pub fn new(matches: Vec<Match>, teams: Vec<TeamId>, lambda: f64) -> Self {
        Self {
            matches,
            teams,
            lambda,
        }
    }

    /// Use every team that appears in `matches` as the universe.
    pub fn from_matches(matches: Vec<Match>, lambda: f64) -> Self {
        let teams = teams_from_matches(&matches);
        Self::new(matches, teams, lambda)
    }

    /// Resolve λ from `policy` using the metric-independent design matrix.
    ///
    /// `teams = None` derives the universe from the matches.
    pub fn with_policy(
        matches: Vec<Match>,
        teams: Option<Vec<TeamId>>,
        policy: &LambdaPolicy,
    ) -> Result<(Self, LambdaChoice), CalcError> {
        let teams = teams.unwrap_or_else(|| teams_from_matches(&matches));

        let indicator = match build_indicator(&matches, &teams) {
            Ok(sys) => Some(sys),
            Err(CalcError::InsufficientData) => None,
            Err(e) => return Err(e),
        };
        let choice = policy.choose_lambda(matches.len(), indicator.as_ref().map(|s| &s.a))?;

        log::info!(
            "Using lambda={} ({:?}) for {} matches.",
            choice.lambda,
            choice.strategy,
            matches.len()
        );
        Ok((Self::new(matches, teams, choice.lambda), choice))
    }

    /// Solve one regression metric and report fit diagnostics.
    ///
    /// No matches or no active teams yields an empty rating map.
    pub fn calculate(&self, metric: Metric) -> Result<MetricFit, CalcError> {
        let system = match build_design(&self.matches, &self.teams, |m, side| {
            alliance_target(metric, m, side)
        }) {
            Ok(sys) => sys,
            Err(CalcError::InsufficientData) => {
                log::debug!("{}: no matches or active teams, returning empty ratings.", metric.display_name());
                return Ok(empty_fit(metric));
            }
            Err(e) => return Err(e),
        };

        let x = if self.lambda == 0.0 {
            solve_least_squares(&system.a, &system.b)?
        } else {
            solve_least_squares_regularized(&system.a, &system.b, self.lambda)?
        };

        let quality = fit_quality(&system, &x)?;
        log::debug!(
            "{}: {} teams, {} rows, rmse={:.3}",
            metric.display_name(),
            system.teams.len(),
            quality.rows,
            quality.rmse
        );

        Ok(MetricFit {
            metric,
            ratings: system.decode(&x)?,
            quality,
        })
    }

    pub fn calculate_opr(&self) -> Result<PerformanceResult, CalcError> {
        Ok(self.calculate(Metric::Opr)?.ratings)
    }

    pub fn calculate_np_opr(&self) -> Result<PerformanceResult, CalcError> {
        Ok(self.calculate(Metric::NpOpr)?.ratings)
    }

    pub fn calculate_dpr(&self) -> Result<PerformanceResult, CalcError> {
        Ok(self.calculate(Metric::Dpr)?.ratings)
    }

    pub fn calculate_np_dpr(&self) -> Result<PerformanceResult, CalcError> {
        Ok(self.calculate(Metric::NpDpr)?.ratings)
    }

    pub fn calculate_ccwm(&self) -> Result<PerformanceResult, CalcError> {
        Ok(self.calculate(Metric::Ccwm)?.ratings)
    }

    /// Mean non-penalty alliance score of `team` over the configured matches.
    pub fn calculate_np_avg(&self, team: TeamId) -> f64 {
        np_avg(&self.matches, team)
    }

    /// Solve `metrics` concurrently; results come back in input order.
    pub fn calculate_many(&self, metrics: &[Metric]) -> Vec<(Metric, Result<MetricFit, CalcError>)> {
        metrics
            .par_iter()
            .map(|&metric| (metric, self.calculate(metric)))
            .collect()
    }

    /// All five regression metrics.
    pub fn calculate_all(&self) -> Vec<(Metric, Result<MetricFit, CalcError>)> {
        self.calculate_many(&Metric::ALL)
    }
}

fn empty_fit(metric: Metric) -> MetricFit {
    MetricFit {
        metric,
        ratings: PerformanceResult::new(),
        quality: FitQuality {
            sse: 0.0,
            rmse: 0.0,
            rows: 0,
        },
    }
}

fn fit_quality(system: &DesignSystem, x: &DVector<f64>) -> Result<FitQuality, CalcError> {
    let fitted = multiply_vec(&system.a, x)?;
    let residuals = fitted - &system.b;
    let sse = residuals.norm_squared();
    let rows = system.rows();
    let rmse = if rows == 0 { 0.0 } else { (sse / rows as f64).sqrt() };
    Ok(FitQuality { sse, rmse, rows })
}
