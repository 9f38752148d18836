//! Formatted terminal output.
//!
//! Formatting stays here so the solver code never touches strings and
//! output changes are localized.

use std::path::Path;

use crate::domain::{Metric, MetricFit};
use crate::error::CalcError;
use crate::io::ingest::IngestedMatches;
use crate::rating::LambdaChoice;
use crate::report::TeamRow;

/// One-line description of how λ was chosen.
pub fn format_lambda_choice(choice: &LambdaChoice) -> String {
    let mut out = format!("lambda={} (strategy={:?}", fmt_lambda(choice.lambda), choice.strategy);
    if let Some(cond) = choice.condition {
        out.push_str(&format!(", cond={}", fmt_condition(cond)));
    }
    if choice.iterations > 0 {
        out.push_str(&format!(", iterations={}", choice.iterations));
    }
    out.push(')');
    if choice.ill_conditioned {
        out.push_str(" [ill-conditioned]");
    }
    out
}

/// Dataset stats, λ choice and per-metric diagnostics.
pub fn format_run_summary(
    source: &Path,
    ingest: &IngestedMatches,
    choice: &LambdaChoice,
    fits: &[MetricFit],
    failures: &[(Metric, CalcError)],
) -> String {
    let mut out = String::new();

    out.push_str("=== opr - alliance regression ratings ===\n");
    out.push_str(&format!("Source: {}\n", source.display()));
    out.push_str(&format!(
        "Matches: {} used | {} rows read | {} skipped\n",
        ingest.matches.len(),
        ingest.rows_read,
        ingest.row_errors.len()
    ));
    for e in ingest.row_errors.iter().take(5) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if ingest.row_errors.len() > 5 {
        out.push_str(&format!("  ... and {} more\n", ingest.row_errors.len() - 5));
    }
    out.push_str(&format!("Ridge: {}\n", format_lambda_choice(choice)));

    out.push_str("\nMetric diagnostics:\n");
    for fit in fits {
        out.push_str(&format!(
            "  {:<6} teams={:<4} rows={:<5} RMSE={:.3}\n",
            fit.metric.display_name(),
            fit.ratings.len(),
            fit.quality.rows,
            fit.quality.rmse
        ));
    }
    for (metric, err) in failures {
        out.push_str(&format!("  ({} failed) {err}\n", metric.display_name()));
    }

    out
}

/// Ratings table, limited to the first `top_n` rows.
///
/// Columns follow `metrics`; a metric that failed shows `-`.
pub fn format_ratings(rows: &[TeamRow], metrics: &[Metric], top_n: usize) -> String {
    let mut out = String::new();

    let mut header = format!("{:>4} {:>6} {:>3} {:>8}", "#", "team", "mp", "npavg");
    let mut rule = format!("{:->4} {:->6} {:->3} {:->8}", "", "", "", "");
    for metric in metrics {
        header.push_str(&format!(" {:>8}", metric.display_name()));
        rule.push_str(&format!(" {:->8}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(rule.trim_end());
    out.push('\n');

    for (rank, row) in rows.iter().take(top_n).enumerate() {
        let mut line = format!(
            "{:>4} {:>6} {:>3} {:>8.2}",
            rank + 1,
            row.team.to_string(),
            row.matches_played,
            row.np_avg
        );
        for metric in metrics {
            match row.values.get(metric) {
                Some(v) => line.push_str(&format!(" {v:>8.2}")),
                None => line.push_str(&format!(" {:>8}", "-")),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn fmt_lambda(lambda: f64) -> String {
    if lambda == 0.0 {
        "0".to_string()
    } else {
        format!("{lambda:.6}")
    }
}

fn fmt_condition(cond: f64) -> String {
    if cond.is_finite() {
        format!("{cond:.3e}")
    } else {
        "inf".to_string()
    }
}
