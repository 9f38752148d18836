//! Export per-team ratings to CSV.
//!
//! One row per team, one column per metric. Metrics that were not solved in
//! the run are left blank so the column layout never changes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data::SyntheticEvent;
use crate::domain::Metric;
use crate::error::AppError;
use crate::report::TeamRow;

const HEADER: &str = "team,matches_played,npavg,opr,npopr,dpr,npdpr,ccwm";

/// Write the ratings table to a CSV file.
pub fn write_ratings_csv(path: &Path, rows: &[TeamRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_ratings_csv_to(&mut out, rows)?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    log::info!("Wrote {} rows to '{}'.", rows.len(), path.display());
    Ok(())
}

pub fn write_ratings_csv_to<W: Write>(out: &mut W, rows: &[TeamRow]) -> Result<(), AppError> {
    writeln!(out, "{HEADER}").map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in rows {
        let metrics: Vec<String> = Metric::ALL
            .iter()
            .map(|m| row.values.get(m).map(|v| format!("{v:.6}")).unwrap_or_default())
            .collect();
        writeln!(
            out,
            "{},{},{:.4},{}",
            row.team,
            row.matches_played,
            row.np_avg,
            metrics.join(",")
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

/// Write a generated event as `{ "matches": [...], "truth": {...} }`.
///
/// The file loads back through `load_matches` unchanged.
pub fn write_event_json(path: &Path, event: &SyntheticEvent) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create event JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), event)
        .map_err(|e| AppError::new(2, format!("Failed to write event JSON: {e}")))?;
    Ok(())
}
