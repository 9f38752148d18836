//! Per-metric regression targets and the non-regression NpAVG.
//!
//! Every regression metric is the same least squares problem with a different
//! right-hand side. For the red alliance of a match:
//!
//! | Metric | target              |
//! |--------|---------------------|
//! | OPR    | red score           |
//! | NpOPR  | red score − red pen |
//! | DPR    | blue score          |
//! | NpDPR  | blue score − blue pen |
//! | CCWM   | red score − blue score |
//!
//! The blue alliance is the mirror image.

use crate::domain::{Alliance, Match, Metric, TeamId};

/// Regression target for `alliance` of `m` under `metric`.
pub fn alliance_target(metric: Metric, m: &Match, alliance: Alliance) -> f64 {
    let opp = alliance.opponent();
    match metric {
        Metric::Opr => m.score(alliance),
        Metric::NpOpr => m.non_penalty_score(alliance),
        Metric::Dpr => m.score(opp),
        Metric::NpDpr => m.non_penalty_score(opp),
        Metric::Ccwm => m.score(alliance) - m.score(opp),
    }
}

/// Mean non-penalty alliance score over every appearance of `team`.
///
/// Returns 0 when the team never played.
pub fn np_avg(matches: &[Match], team: TeamId) -> f64 {
    let (sum, count) = matches
        .iter()
        .filter_map(|m| m.alliance_of(team).map(|side| m.non_penalty_score(side)))
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));

    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Number of matches `team` appeared in.
pub fn matches_played(matches: &[Match], team: TeamId) -> usize {
    matches.iter().filter(|m| m.alliance_of(team).is_some()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccwm_targets_cancel_within_a_match() {
        let m = Match::new([1, 2], [3, 4], 100.0, 80.0, 0.0, 0.0);
        let red = alliance_target(Metric::Ccwm, &m, Alliance::Red);
        let blue = alliance_target(Metric::Ccwm, &m, Alliance::Blue);
        assert_eq!(red, 20.0);
        assert_eq!(blue, -20.0);
        assert_eq!(red + blue, 0.0);
    }

    #[test]
    fn targets_follow_the_metric_table() {
        let m = Match::new([1], [2], 100.0, 80.0, 10.0, 4.0);
        assert_eq!(alliance_target(Metric::Opr, &m, Alliance::Red), 100.0);
        assert_eq!(alliance_target(Metric::NpOpr, &m, Alliance::Red), 90.0);
        assert_eq!(alliance_target(Metric::Dpr, &m, Alliance::Red), 80.0);
        assert_eq!(alliance_target(Metric::NpDpr, &m, Alliance::Red), 76.0);

        assert_eq!(alliance_target(Metric::Opr, &m, Alliance::Blue), 80.0);
        assert_eq!(alliance_target(Metric::NpOpr, &m, Alliance::Blue), 76.0);
        assert_eq!(alliance_target(Metric::Dpr, &m, Alliance::Blue), 100.0);
        assert_eq!(alliance_target(Metric::NpDpr, &m, Alliance::Blue), 90.0);
    }

    #[test]
    fn np_avg_averages_non_penalty_alliance_scores() {
        let matches = vec![
            Match::new([7, 1], [2, 3], 50.0, 10.0, 5.0, 0.0),
            Match::new([4, 5], [7, 6], 30.0, 70.0, 0.0, 0.0),
            Match::new([4, 5], [2, 6], 99.0, 99.0, 0.0, 0.0),
        ];
        assert_eq!(np_avg(&matches, TeamId(7)), 57.5);
        assert_eq!(matches_played(&matches, TeamId(7)), 2);
    }

    #[test]
    fn np_avg_of_absent_team_is_zero() {
        let matches = vec![Match::new([1], [2], 10.0, 20.0, 0.0, 0.0)];
        assert_eq!(np_avg(&matches, TeamId(3)), 0.0);
        assert_eq!(np_avg(&[], TeamId(1)), 0.0);
    }
}
