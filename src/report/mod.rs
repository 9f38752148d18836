//! Reporting utilities: per-team rows, alliance score predictions and
//! formatted terminal output.

pub mod format;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Alliance, Match, Metric, MetricFit, PerformanceResult, TeamId};
use crate::metrics::{matches_played, np_avg};

pub use format::*;

/// Everything known about one team after a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRow {
    pub team: TeamId,
    pub matches_played: usize,
    pub np_avg: f64,
    /// Only metrics that solved successfully are present.
    pub values: BTreeMap<Metric, f64>,
}

/// Build one row per team that appears in at least one fit, ranked by the
/// first available metric (descending).
pub fn build_team_rows(matches: &[Match], fits: &[MetricFit]) -> Vec<TeamRow> {
    let mut rows: BTreeMap<TeamId, TeamRow> = BTreeMap::new();
    for fit in fits {
        for (&team, &value) in &fit.ratings {
            rows.entry(team)
                .or_insert_with(|| TeamRow {
                    team,
                    matches_played: matches_played(matches, team),
                    np_avg: np_avg(matches, team),
                    values: BTreeMap::new(),
                })
                .values
                .insert(fit.metric, value);
        }
    }

    let mut out: Vec<TeamRow> = rows.into_values().collect();
    if let Some(primary) = fits.first().map(|f| f.metric) {
        out.sort_by(|a, b| {
            let va = a.values.get(&primary).copied().unwrap_or(f64::NEG_INFINITY);
            let vb = b.values.get(&primary).copied().unwrap_or(f64::NEG_INFINITY);
            vb.partial_cmp(&va)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.team.cmp(&b.team))
        });
    }
    out
}

/// Predicted alliance score: the sum of its members' OPR (unknown teams add 0).
pub fn predict_alliance_score(opr: &PerformanceResult, alliance: &[TeamId]) -> f64 {
    alliance.iter().filter_map(|t| opr.get(t)).sum()
}

/// Fraction of decided matches whose winner is the alliance with the higher
/// summed OPR. `None` when there is no decided match to score.
pub fn prediction_accuracy(opr: &PerformanceResult, matches: &[Match]) -> Option<f64> {
    let mut decided = 0usize;
    let mut correct = 0usize;
    for m in matches {
        let Some(actual) = m.winner() else {
            continue;
        };
        decided += 1;
        let red = predict_alliance_score(opr, m.teams(Alliance::Red));
        let blue = predict_alliance_score(opr, m.teams(Alliance::Blue));
        let predicted = if red > blue {
            Some(Alliance::Red)
        } else if blue > red {
            Some(Alliance::Blue)
        } else {
            None
        };
        if predicted == Some(actual) {
            correct += 1;
        }
    }
    if decided == 0 {
        return None;
    }
    Some(correct as f64 / decided as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitQuality;

    fn fit(metric: Metric, values: &[(u32, f64)]) -> MetricFit {
        MetricFit {
            metric,
            ratings: values.iter().map(|&(t, v)| (TeamId(t), v)).collect(),
            quality: FitQuality {
                sse: 0.0,
                rmse: 0.0,
                rows: 0,
            },
        }
    }

    #[test]
    fn rows_are_ranked_by_first_metric() {
        let matches = vec![Match::new([1, 2], [3, 4], 50.0, 40.0, 0.0, 0.0)];
        let fits = vec![
            fit(Metric::Opr, &[(1, 10.0), (2, 30.0), (3, 20.0), (4, 5.0)]),
            fit(Metric::Dpr, &[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]),
        ];
        let rows = build_team_rows(&matches, &fits);
        let order: Vec<u32> = rows.iter().map(|r| r.team.0).collect();
        assert_eq!(order, vec![2, 3, 1, 4]);
        assert_eq!(rows[0].values[&Metric::Dpr], 2.0);
        assert_eq!(rows[0].matches_played, 1);
        assert_eq!(rows[0].np_avg, 50.0);
    }

    #[test]
    fn prediction_uses_summed_opr() {
        let opr: PerformanceResult = [(TeamId(1), 10.0), (TeamId(2), 20.0), (TeamId(3), 5.0)]
            .into_iter()
            .collect();
        assert_eq!(predict_alliance_score(&opr, &[TeamId(1), TeamId(2), TeamId(9)]), 30.0);

        let matches = vec![
            Match::new([1, 2], [3], 50.0, 10.0, 0.0, 0.0),
            Match::new([3], [1], 60.0, 10.0, 0.0, 0.0),
            Match::new([1], [2], 10.0, 10.0, 0.0, 0.0),
        ];
        assert_eq!(prediction_accuracy(&opr, &matches), Some(0.5));
        assert_eq!(prediction_accuracy(&opr, &matches[2..]), None);
    }
}
