//! Shared "rate" pipeline.
//!
//! load matches -> choose λ -> solve metrics (parallel) -> team table
//!
//! The CLI handlers only deal with presentation and exports.

use crate::domain::{Metric, MetricFit, RunConfig};
use crate::error::{AppError, CalcError};
use crate::io::ingest::{IngestedMatches, load_matches};
use crate::rating::{LambdaChoice, LambdaPolicy, PerformanceCalculator};
use crate::report::{TeamRow, build_team_rows, prediction_accuracy};

/// All computed outputs of a single `opr rate` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedMatches,
    pub choice: LambdaChoice,
    pub fits: Vec<MetricFit>,
    /// Metrics whose solve failed; the rest of the run still stands.
    pub failures: Vec<(Metric, CalcError)>,
    pub rows: Vec<TeamRow>,
    pub prediction_accuracy: Option<f64>,
}

/// Execute the full pipeline for the match file named in `config`.
pub fn run_ratings(config: &RunConfig) -> Result<RunOutput, AppError> {
    let ingest = load_matches(&config.matches_path)?;
    run_ratings_with_matches(config, ingest)
}

/// Execute the pipeline on already-ingested matches.
pub fn run_ratings_with_matches(config: &RunConfig, ingest: IngestedMatches) -> Result<RunOutput, AppError> {
    let policy = LambdaPolicy::from_strategy(config.strategy, config.lambda);
    let (calc, choice) =
        PerformanceCalculator::with_policy(ingest.matches.clone(), config.teams.clone(), &policy)?;

    let metrics: Vec<Metric> = match config.metric {
        Some(m) => vec![m],
        None => Metric::ALL.to_vec(),
    };

    let mut fits = Vec::with_capacity(metrics.len());
    let mut failures = Vec::new();
    for (metric, result) in calc.calculate_many(&metrics) {
        match result {
            Ok(fit) => fits.push(fit),
            Err(e) => {
                log::warn!("{} failed: {e}", metric.display_name());
                failures.push((metric, e));
            }
        }
    }

    if fits.is_empty() {
        if let Some((_, err)) = failures.into_iter().next() {
            return Err(err.into());
        }
        return Err(CalcError::InsufficientData.into());
    }

    let rows = build_team_rows(&calc.matches, &fits);
    let accuracy = fits
        .iter()
        .find(|f| f.metric == Metric::Opr)
        .and_then(|f| prediction_accuracy(&f.ratings, &calc.matches));

    Ok(RunOutput {
        ingest,
        choice,
        fits,
        failures,
        rows,
        prediction_accuracy: accuracy,
    })
}
