//! Match file ingest.
//!
//! Two formats are accepted:
//!
//! - **JSON**: either an array of match objects or an object with a `matches`
//!   array (the shape written by `opr simulate`).
//! - **CSV** with columns `red_teams`, `blue_teams`, `red_score`, `blue_score`
//!   and optional `red_penalties`, `blue_penalties`. Team lists are separated
//!   by spaces, `;` or `|`.
//!
//! Bad CSV rows are skipped and reported, not fatal. A file with no usable
//! matches is an error (exit code 3).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;

use crate::domain::{Match, TeamId};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated matches plus anything that was skipped.
#[derive(Debug, Clone)]
pub struct IngestedMatches {
    pub matches: Vec<Match>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonMatches {
    Bare(Vec<Match>),
    Wrapped { matches: Vec<Match> },
}

/// Load matches from `path`, picking the format from the extension.
pub fn load_matches(path: &Path) -> Result<IngestedMatches, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open match file '{}': {e}", path.display())))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let ingested = if is_json {
        parse_matches_json(file)?
    } else {
        parse_matches_csv(file)?
    };

    if ingested.matches.is_empty() {
        return Err(AppError::new(
            3,
            format!("No valid matches found in '{}'.", path.display()),
        ));
    }
    log::info!(
        "Loaded {} matches from '{}' ({} rows skipped).",
        ingested.matches.len(),
        path.display(),
        ingested.row_errors.len()
    );
    Ok(ingested)
}

pub fn parse_matches_json<R: Read>(reader: R) -> Result<IngestedMatches, AppError> {
    let parsed: JsonMatches = serde_json::from_reader(reader)
        .map_err(|e| AppError::new(2, format!("Invalid match JSON: {e}")))?;
    let raw = match parsed {
        JsonMatches::Bare(m) => m,
        JsonMatches::Wrapped { matches } => matches,
    };

    let rows_read = raw.len();
    let mut matches = Vec::with_capacity(raw.len());
    let mut row_errors = Vec::new();
    for (idx, m) in raw.into_iter().enumerate() {
        // Entries are numbered from 1 in both the message and `line`.
        let line = idx + 1;
        match m.validate(line) {
            Ok(()) => matches.push(m),
            Err(e) => row_errors.push(RowError {
                line,
                message: e.to_string(),
            }),
        }
    }

    Ok(IngestedMatches {
        matches,
        row_errors,
        rows_read,
    })
}

pub fn parse_matches_csv<R: Read>(reader: R) -> Result<IngestedMatches, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for col in ["red_teams", "blue_teams", "red_score", "blue_score"] {
        if !header_map.contains_key(col) {
            return Err(AppError::new(2, format!("Missing required column: `{col}`")));
        }
    }

    let mut matches = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let parsed = parse_row(&record, &header_map)
            .and_then(|m| m.validate(line).map(|_| m).map_err(|e| e.to_string()));
        match parsed {
            Ok(m) => matches.push(m),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    Ok(IngestedMatches {
        matches,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Strip a UTF-8 BOM some spreadsheet exports put on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Match, String> {
    let field = |name| get_field(record, header_map, name);

    let red_teams = parse_team_list(field("red_teams").ok_or("missing red_teams")?)?;
    let blue_teams = parse_team_list(field("blue_teams").ok_or("missing blue_teams")?)?;
    if red_teams.is_empty() || blue_teams.is_empty() {
        return Err("empty alliance".to_string());
    }

    Ok(Match {
        red_teams,
        blue_teams,
        red_score: parse_number(field("red_score"), "red_score")?,
        blue_score: parse_number(field("blue_score"), "blue_score")?,
        red_penalties: parse_optional_number(field("red_penalties"), "red_penalties")?,
        blue_penalties: parse_optional_number(field("blue_penalties"), "blue_penalties")?,
    })
}

fn get_field<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    header_map
        .get(name)
        .and_then(|&i| record.get(i))
        .filter(|s| !s.is_empty())
}

/// Parse `"254 1114 2056"`, `"254;1114"` or `"254|1114"`.
pub fn parse_team_list(raw: &str) -> Result<Vec<TeamId>, String> {
    raw.split(|c: char| c.is_whitespace() || c == ';' || c == '|')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim_start_matches("frc")
                .parse::<u32>()
                .map(TeamId)
                .map_err(|_| format!("invalid team number '{s}'"))
        })
        .collect()
}

fn parse_number(raw: Option<&str>, name: &str) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("missing {name}"))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("invalid {name} '{raw}'"))?;
    if !v.is_finite() {
        return Err(format!("non-finite {name}"));
    }
    Ok(v)
}

fn parse_optional_number(raw: Option<&str>, name: &str) -> Result<f64, String> {
    match raw {
        Some(_) => parse_number(raw, name),
        None => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_parse_and_bad_rows_are_reported() {
        let csv = "\u{feff}Red_Teams,blue_teams,red_score,blue_score,red_penalties,blue_penalties\n\
                   254 1114 2056,118;148;971,120,95,10,0\n\
                   1 2 3,4 5 6,abc,10,,\n\
                   1 2 3,3 4 5,10,10,,\n\
                   frc7 8 9,10 11 12,30,40,,\n";
        let ingested = parse_matches_csv(csv.as_bytes()).unwrap();

        assert_eq!(ingested.rows_read, 4);
        assert_eq!(ingested.matches.len(), 2);
        assert_eq!(ingested.row_errors.len(), 2);
        assert_eq!(ingested.row_errors[0].line, 3);
        // The overlap error names the same line it is filed under.
        assert_eq!(ingested.row_errors[1].line, 4);
        assert!(ingested.row_errors[1].message.contains("#4"), "{}", ingested.row_errors[1].message);

        let first = &ingested.matches[0];
        assert_eq!(first.red_teams, vec![TeamId(254), TeamId(1114), TeamId(2056)]);
        assert_eq!(first.blue_teams, vec![TeamId(118), TeamId(148), TeamId(971)]);
        assert_eq!(first.red_penalties, 10.0);
        assert_eq!(ingested.matches[1].red_teams[0], TeamId(7));
        assert_eq!(ingested.matches[1].blue_penalties, 0.0);
    }

    #[test]
    fn csv_without_required_columns_is_rejected() {
        let csv = "red_teams,blue_teams,red_score\n1,2,3\n";
        let err = parse_matches_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn json_accepts_bare_and_wrapped_arrays() {
        let bare = r#"[{"red_teams":[1,2],"blue_teams":[3,4],"red_score":50,"blue_score":40}]"#;
        let wrapped = r#"{"matches":[{"red_teams":[1,2],"blue_teams":[3,4],"red_score":50,"blue_score":40,"red_penalties":5,"blue_penalties":0}],"truth":{}}"#;

        let a = parse_matches_json(bare.as_bytes()).unwrap();
        let b = parse_matches_json(wrapped.as_bytes()).unwrap();
        assert_eq!(a.matches.len(), 1);
        assert_eq!(a.matches[0].red_penalties, 0.0);
        assert_eq!(b.matches[0].red_penalties, 5.0);
    }

    #[test]
    fn json_inconsistent_match_is_skipped() {
        let json = r#"[{"red_teams":[1,2],"blue_teams":[2,4],"red_score":50,"blue_score":40}]"#;
        let ingested = parse_matches_json(json.as_bytes()).unwrap();
        assert!(ingested.matches.is_empty());
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].line, 1);
        assert!(ingested.row_errors[0].message.contains("#1"));
    }
}
