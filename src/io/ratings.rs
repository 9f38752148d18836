//! Read/write ratings JSON files.
//!
//! A ratings file is the portable record of one run: the λ choice, every
//! solved metric with its fit diagnostics and the per-team table.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::MetricFit;
use crate::error::AppError;
use crate::rating::LambdaChoice;
use crate::report::TeamRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub source: PathBuf,
    pub match_count: usize,
    pub lambda: LambdaChoice,
    pub metrics: Vec<MetricFit>,
    pub teams: Vec<TeamRow>,
    /// Share of decided matches called correctly by summed OPR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_accuracy: Option<f64>,
}

impl RatingsFile {
    pub fn new(
        source: &Path,
        match_count: usize,
        lambda: LambdaChoice,
        metrics: Vec<MetricFit>,
        teams: Vec<TeamRow>,
        prediction_accuracy: Option<f64>,
    ) -> Self {
        Self {
            tool: "opr".to_string(),
            generated_at: Utc::now(),
            source: source.to_path_buf(),
            match_count,
            lambda,
            metrics,
            teams,
            prediction_accuracy,
        }
    }
}

pub fn write_ratings_json(path: &Path, ratings: &RatingsFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create ratings JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, ratings)
        .map_err(|e| AppError::new(2, format!("Failed to write ratings JSON: {e}")))?;
    log::info!("Wrote ratings JSON to '{}'.", path.display());
    Ok(())
}

pub fn read_ratings_json(path: &Path) -> Result<RatingsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open ratings JSON '{}': {e}", path.display())))?;
    let ratings: RatingsFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid ratings JSON: {e}")))?;
    Ok(ratings)
}
