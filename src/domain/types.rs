//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - read from match files (JSON/CSV)
//! - used in-memory while building and solving rating systems
//! - exported to JSON/CSV after a run

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Team number as assigned by the competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Red,
    Blue,
}

impl Alliance {
    pub const BOTH: [Alliance; 2] = [Alliance::Red, Alliance::Blue];

    pub fn opponent(self) -> Alliance {
        match self {
            Alliance::Red => Alliance::Blue,
            Alliance::Blue => Alliance::Red,
        }
    }
}

/// A single played match between a red and a blue alliance.
///
/// `*_penalties` are the penalty points contained in that alliance's score,
/// i.e. points it received because of fouls committed by the opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub red_teams: Vec<TeamId>,
    pub blue_teams: Vec<TeamId>,
    pub red_score: f64,
    pub blue_score: f64,
    #[serde(default)]
    pub red_penalties: f64,
    #[serde(default)]
    pub blue_penalties: f64,
}

impl Match {
    pub fn new(
        red_teams: impl IntoIterator<Item = u32>,
        blue_teams: impl IntoIterator<Item = u32>,
        red_score: f64,
        blue_score: f64,
        red_penalties: f64,
        blue_penalties: f64,
    ) -> Self {
        Self {
            red_teams: red_teams.into_iter().map(TeamId).collect(),
            blue_teams: blue_teams.into_iter().map(TeamId).collect(),
            red_score,
            blue_score,
            red_penalties,
            blue_penalties,
        }
    }

    pub fn teams(&self, alliance: Alliance) -> &[TeamId] {
        match alliance {
            Alliance::Red => &self.red_teams,
            Alliance::Blue => &self.blue_teams,
        }
    }

    pub fn score(&self, alliance: Alliance) -> f64 {
        match alliance {
            Alliance::Red => self.red_score,
            Alliance::Blue => self.blue_score,
        }
    }

    pub fn penalties(&self, alliance: Alliance) -> f64 {
        match alliance {
            Alliance::Red => self.red_penalties,
            Alliance::Blue => self.blue_penalties,
        }
    }

    /// Alliance score with penalty points removed.
    pub fn non_penalty_score(&self, alliance: Alliance) -> f64 {
        self.score(alliance) - self.penalties(alliance)
    }

    /// Which alliance `team` played on, if any.
    pub fn alliance_of(&self, team: TeamId) -> Option<Alliance> {
        if self.red_teams.contains(&team) {
            Some(Alliance::Red)
        } else if self.blue_teams.contains(&team) {
            Some(Alliance::Blue)
        } else {
            None
        }
    }

    /// The winning alliance, or `None` for a tie.
    pub fn winner(&self) -> Option<Alliance> {
        match self.red_score.partial_cmp(&self.blue_score) {
            Some(std::cmp::Ordering::Greater) => Some(Alliance::Red),
            Some(std::cmp::Ordering::Less) => Some(Alliance::Blue),
            _ => None,
        }
    }

    fn all_finite(&self) -> bool {
        [
            self.red_score,
            self.blue_score,
            self.red_penalties,
            self.blue_penalties,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Data-integrity check: finite numbers and disjoint alliances.
    pub fn validate(&self, index: usize) -> Result<(), crate::error::CalcError> {
        if !self.all_finite() {
            return Err(crate::error::CalcError::NonFiniteInput { index });
        }
        if let Some(team) = self.red_teams.iter().find(|t| self.blue_teams.contains(t)) {
            return Err(crate::error::CalcError::InconsistentMatch {
                index,
                team: team.0,
            });
        }
        Ok(())
    }
}

/// Regression-based rating metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lower")]
pub enum Metric {
    Opr,
    NpOpr,
    Dpr,
    NpDpr,
    Ccwm,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Opr,
        Metric::NpOpr,
        Metric::Dpr,
        Metric::NpDpr,
        Metric::Ccwm,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Opr => "OPR",
            Metric::NpOpr => "NpOPR",
            Metric::Dpr => "DPR",
            Metric::NpDpr => "NpDPR",
            Metric::Ccwm => "CCWM",
        }
    }
}

/// Per-team value of one metric. Teams that never played are absent.
pub type PerformanceResult = BTreeMap<TeamId, f64>;

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    /// Equations in the system (two per match).
    pub rows: usize,
}

/// Solved ratings for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricFit {
    pub metric: Metric,
    pub ratings: PerformanceResult,
    pub quality: FitQuality,
}

/// How the ridge strength λ is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LambdaStrategy {
    /// Use the caller-supplied λ (0 = unregularized).
    Explicit,
    /// Coarse bands keyed on match count.
    Band,
    /// `clamp(0.5 / sqrt(n), 0.001, 0.3)`.
    Continuous,
    /// Condition-number driven doubling from the continuous value.
    Auto,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, `.env` and defaults.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub matches_path: PathBuf,
    /// Explicit team universe; `None` derives it from the matches.
    pub teams: Option<Vec<TeamId>>,
    pub strategy: LambdaStrategy,
    /// Used when `strategy = explicit`.
    pub lambda: f64,
    /// Restrict the run to a single metric.
    pub metric: Option<Metric>,
    pub top_n: usize,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
