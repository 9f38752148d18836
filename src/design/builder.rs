//! Alliance design matrix construction.
//!
//! For `N` matches and `K` active teams the system has `2N` rows and `K`
//! columns. Row `2i` is the red alliance of match `i`, row `2i + 1` the blue
//! alliance; each row holds a 1 in the column of every active team on that
//! alliance. The target value of each row comes from a caller-supplied scoring
//! function so the same builder serves every metric.

use std::collections::{BTreeSet, HashMap, HashSet};

use nalgebra::{DMatrix, DVector};

use crate::domain::{Alliance, Match, PerformanceResult, TeamId};
use crate::error::CalcError;

/// A built system `A x ≈ b` plus the team owning each column of `A`.
#[derive(Debug, Clone)]
pub struct DesignSystem {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub teams: Vec<TeamId>,
}

impl DesignSystem {
    pub fn rows(&self) -> usize {
        self.a.nrows()
    }

    /// Pair a solution vector with the column teams.
    pub fn decode(&self, x: &DVector<f64>) -> Result<PerformanceResult, CalcError> {
        if x.len() != self.teams.len() {
            return Err(CalcError::DimensionMismatch {
                expected: self.teams.len(),
                actual: x.len(),
            });
        }
        Ok(self.teams.iter().copied().zip(x.iter().copied()).collect())
    }
}

/// Distinct teams across all alliances, ascending.
pub fn teams_from_matches(matches: &[Match]) -> Vec<TeamId> {
    let set: BTreeSet<TeamId> = matches
        .iter()
        .flat_map(|m| m.red_teams.iter().chain(m.blue_teams.iter()))
        .copied()
        .collect();
    set.into_iter().collect()
}

/// The subset of `teams` that played at least one match, in the caller's order.
///
/// Duplicates in `teams` keep their first position only.
pub fn active_teams(matches: &[Match], teams: &[TeamId]) -> Vec<TeamId> {
    let played: HashSet<TeamId> = matches
        .iter()
        .flat_map(|m| m.red_teams.iter().chain(m.blue_teams.iter()))
        .copied()
        .collect();
    let mut seen = HashSet::with_capacity(teams.len());
    teams
        .iter()
        .copied()
        .filter(|t| played.contains(t) && seen.insert(*t))
        .collect()
}

/// Build `(A, b, activeTeams)` for one scoring function.
///
/// Teams on an alliance but missing from `teams` are dropped from that row.
pub fn build_design<F>(matches: &[Match], teams: &[TeamId], score_fn: F) -> Result<DesignSystem, CalcError>
where
    F: Fn(&Match, Alliance) -> f64,
{
    for (index, m) in matches.iter().enumerate() {
        m.validate(index)?;
    }

    let active = active_teams(matches, teams);
    if matches.is_empty() || active.is_empty() {
        return Err(CalcError::InsufficientData);
    }

    let column: HashMap<TeamId, usize> = active.iter().enumerate().map(|(j, t)| (*t, j)).collect();

    let rows = 2 * matches.len();
    let mut a = DMatrix::<f64>::zeros(rows, active.len());
    let mut b = DVector::<f64>::zeros(rows);

    for (i, m) in matches.iter().enumerate() {
        for (offset, alliance) in Alliance::BOTH.into_iter().enumerate() {
            let row = 2 * i + offset;
            for team in m.teams(alliance) {
                if let Some(&j) = column.get(team) {
                    a[(row, j)] = 1.0;
                }
            }
            b[row] = score_fn(m, alliance);
        }
    }

    Ok(DesignSystem { a, b, teams: active })
}

/// Metric-independent design matrix (targets are all zero), used for λ tuning.
pub fn build_indicator(matches: &[Match], teams: &[TeamId]) -> Result<DesignSystem, CalcError> {
    build_design(matches, teams, |_, _| 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[u32]) -> Vec<TeamId> {
        v.iter().copied().map(TeamId).collect()
    }

    fn sample_matches() -> Vec<Match> {
        vec![
            Match::new([1, 2], [3, 4], 100.0, 80.0, 10.0, 5.0),
            Match::new([1, 3], [2, 5], 60.0, 70.0, 0.0, 0.0),
            Match::new([4, 5], [2, 3], 90.0, 40.0, 0.0, 20.0),
        ]
    }

    #[test]
    fn shape_is_two_rows_per_match_and_one_column_per_team() {
        let matches = sample_matches();
        let teams = teams_from_matches(&matches);
        let sys = build_design(&matches, &teams, |m, side| m.score(side)).unwrap();

        assert_eq!(sys.a.nrows(), 2 * matches.len());
        assert_eq!(sys.a.ncols(), 5);
        assert!(sys.a.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn rows_follow_match_order_red_then_blue() {
        let matches = sample_matches();
        let teams = teams_from_matches(&matches);
        let sys = build_design(&matches, &teams, |m, side| m.score(side)).unwrap();

        assert_eq!(sys.b.as_slice(), &[100.0, 80.0, 60.0, 70.0, 90.0, 40.0]);
        // Row 0 = red of match 0 = teams 1, 2.
        assert_eq!(sys.a.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 1.0, 0.0, 0.0, 0.0]);
        // Row 1 = blue of match 0 = teams 3, 4.
        assert_eq!(sys.a.row(1).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn idle_teams_get_no_column_and_caller_order_is_kept() {
        let matches = sample_matches();
        let teams = ids(&[5, 99, 4, 3, 2, 1]);
        let sys = build_design(&matches, &teams, |m, side| m.score(side)).unwrap();

        assert_eq!(sys.teams, ids(&[5, 4, 3, 2, 1]));
        assert_eq!(sys.a.ncols(), 5);
    }

    #[test]
    fn teams_outside_the_universe_are_dropped_from_rows() {
        let matches = sample_matches();
        let teams = ids(&[1, 2]);
        let sys = build_design(&matches, &teams, |m, side| m.score(side)).unwrap();

        assert_eq!(sys.a.ncols(), 2);
        // Blue of match 0 (teams 3, 4) has no active columns at all.
        assert!(sys.a.row(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_inputs_are_insufficient() {
        let matches = sample_matches();
        assert_eq!(
            build_design(&[], &ids(&[1]), |m, s| m.score(s)).unwrap_err(),
            CalcError::InsufficientData
        );
        assert_eq!(
            build_design(&matches, &ids(&[42]), |m, s| m.score(s)).unwrap_err(),
            CalcError::InsufficientData
        );
    }

    #[test]
    fn team_on_both_alliances_is_rejected() {
        let matches = vec![Match::new([1, 2], [2, 3], 10.0, 10.0, 0.0, 0.0)];
        let err = build_design(&matches, &ids(&[1, 2, 3]), |m, s| m.score(s)).unwrap_err();
        assert_eq!(err, CalcError::InconsistentMatch { index: 0, team: 2 });
    }

    #[test]
    fn decode_zips_solution_onto_columns() {
        let matches = sample_matches();
        let sys = build_indicator(&matches, &ids(&[2, 1])).unwrap();
        let x = DVector::from_row_slice(&[7.0, 3.0]);
        let map = sys.decode(&x).unwrap();
        assert_eq!(map.get(&TeamId(1)), Some(&3.0));
        assert_eq!(map.get(&TeamId(2)), Some(&7.0));
    }
}
