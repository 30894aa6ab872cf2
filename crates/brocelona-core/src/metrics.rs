// Player metrics: goals and attendance joined with team weekly results.
//
// "Impact" compares how a player's team does in weeks the player turned up
// against weeks the league played without them. Averages over an empty set
// of weeks are reported as 0, so impact is only meaningful for players with
// both attended and absent weeks; see `PlayerMetrics::is_impact_ranked`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::attendance::{AttendanceRecord, RosterEntry};
use crate::standings::{PlayerGoalTally, WeeklyGoalsRecord, WeeklyPointsRecord};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Presence/absence split of one team-level weekly series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ImpactStat {
    pub total_present: u32,
    pub total_absent: u32,
    pub avg_present: f64,
    pub avg_absent: f64,
    /// `avg_present - avg_absent`.
    pub impact: f64,
}

impl ImpactStat {
    /// Split `series` (week -> value, missing weeks are 0) over the two week
    /// sets.
    pub fn compute(
        series: &BTreeMap<u32, u32>,
        present: &BTreeSet<u32>,
        absent: &BTreeSet<u32>,
    ) -> Self {
        let sum = |weeks: &BTreeSet<u32>| -> u32 {
            weeks.iter().map(|w| series.get(w).copied().unwrap_or(0)).sum()
        };
        let total_present = sum(present);
        let total_absent = sum(absent);
        let avg_present = average(total_present, present.len());
        let avg_absent = average(total_absent, absent.len());
        ImpactStat {
            total_present,
            total_absent,
            avg_present,
            avg_absent,
            impact: avg_present - avg_absent,
        }
    }
}

/// Derived statistics for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMetrics {
    pub player: String,
    /// Roster team; `None` for scorers missing from the attendance sheet.
    pub team: Option<String>,
    /// Number of attendance cells marked present.
    pub attendance_count: u32,
    pub goals: u32,
    /// `goals / max(attendance_count, 1)`.
    pub goals_per_attendance: f64,
    /// Distinct weeks attended.
    pub attended_weeks: u32,
    /// League weeks (any counted round) the player did not attend.
    pub absent_weeks: u32,
    pub points: ImpactStat,
    pub goals_for: ImpactStat,
    pub goals_against: ImpactStat,
}

impl PlayerMetrics {
    /// Average team points in the weeks this player attended.
    pub fn points_per_attendance(&self) -> f64 {
        self.points.avg_present
    }

    pub fn team_goals_per_attendance(&self) -> f64 {
        self.goals_for.avg_present
    }

    pub fn team_conceded_per_attendance(&self) -> f64 {
        self.goals_against.avg_present
    }

    /// Whether impact figures mean anything: the player must have both
    /// attended and missed at least one league week.
    pub fn is_impact_ranked(&self) -> bool {
        self.attended_weeks > 0 && self.absent_weeks > 0
    }
}

/// Everything the metrics engine reads.
#[derive(Debug, Clone, Copy)]
pub struct MetricsInputs<'a> {
    pub roster: &'a [RosterEntry],
    pub attendance: &'a [AttendanceRecord],
    pub player_goals: &'a [PlayerGoalTally],
    pub points_history: &'a [WeeklyPointsRecord],
    pub goals_history: &'a [WeeklyGoalsRecord],
    /// Team names as they appear in the match sheet.
    pub match_teams: &'a [String],
}

// ---------------------------------------------------------------------------
// Team weekly series
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct TeamSeries {
    points: BTreeMap<u32, u32>,
    goals_for: BTreeMap<u32, u32>,
    goals_against: BTreeMap<u32, u32>,
}

fn team_series<'a>(
    points_history: &'a [WeeklyPointsRecord],
    goals_history: &'a [WeeklyGoalsRecord],
) -> HashMap<&'a str, TeamSeries> {
    let mut series: HashMap<&'a str, TeamSeries> = HashMap::new();
    for h in points_history {
        *series
            .entry(h.team.as_str())
            .or_default()
            .points
            .entry(h.week)
            .or_insert(0) += h.points_gained;
    }
    for g in goals_history {
        let s = series.entry(g.team.as_str()).or_default();
        *s.goals_for.entry(g.week).or_insert(0) += g.goals_for;
        *s.goals_against.entry(g.week).or_insert(0) += g.goals_against;
    }
    series
}

/// Map a roster team name onto a match-sheet team column. The two sheets are
/// kept by hand and do not always agree ("레드" vs "레드팀"), so an exact match
/// wins, otherwise the first column that contains the roster name or is
/// contained in it.
pub fn resolve_team<'a>(roster_team: &str, match_teams: &'a [String]) -> Option<&'a str> {
    let roster_team = roster_team.trim();
    if roster_team.is_empty() {
        return None;
    }
    match_teams
        .iter()
        .find(|t| t.as_str() == roster_team)
        .or_else(|| {
            match_teams
                .iter()
                .find(|t| t.contains(roster_team) || roster_team.contains(t.as_str()))
        })
        .map(String::as_str)
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Build one `PlayerMetrics` per roster player (roster order) followed by
/// one per scorer absent from the roster (tally order).
pub fn compute_metrics(inputs: MetricsInputs<'_>) -> Vec<PlayerMetrics> {
    // Player -> team, first occurrence wins.
    let mut team_of: HashMap<&str, &str> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for entry in inputs.roster {
        if !team_of.contains_key(entry.player.as_str()) {
            team_of.insert(entry.player.as_str(), entry.team.as_str());
            order.push(entry.player.as_str());
        }
    }
    let roster_players: HashSet<&str> = order.iter().copied().collect();
    for tally in inputs.player_goals {
        if !roster_players.contains(tally.player.as_str()) {
            order.push(tally.player.as_str());
        }
    }

    let goals_of: HashMap<&str, u32> = inputs
        .player_goals
        .iter()
        .map(|t| (t.player.as_str(), t.goals))
        .collect();

    let mut attendance_count: HashMap<&str, u32> = HashMap::new();
    let mut attended: HashMap<&str, BTreeSet<u32>> = HashMap::new();
    for r in inputs.attendance.iter().filter(|r| r.attended) {
        *attendance_count.entry(r.player.as_str()).or_insert(0) += 1;
        attended.entry(r.player.as_str()).or_default().insert(r.week);
    }

    let league_weeks: BTreeSet<u32> = inputs.points_history.iter().map(|h| h.week).collect();
    let series = team_series(inputs.points_history, inputs.goals_history);
    let no_weeks = BTreeSet::new();

    order
        .into_iter()
        .map(|player| {
            let team = team_of.get(player).copied();
            let count = attendance_count.get(player).copied().unwrap_or(0);
            let goals = goals_of.get(player).copied().unwrap_or(0);
            let present = attended.get(player).unwrap_or(&no_weeks);
            let absent: BTreeSet<u32> = league_weeks.difference(present).copied().collect();

            let team_stats = team
                .and_then(|t| resolve_team(t, inputs.match_teams))
                .and_then(|t| series.get(t));
            let (points, goals_for, goals_against) = match team_stats {
                Some(s) => (
                    ImpactStat::compute(&s.points, present, &absent),
                    ImpactStat::compute(&s.goals_for, present, &absent),
                    ImpactStat::compute(&s.goals_against, present, &absent),
                ),
                None => Default::default(),
            };

            PlayerMetrics {
                player: player.to_string(),
                team: team.map(str::to_string),
                attendance_count: count,
                goals,
                goals_per_attendance: goals as f64 / count.max(1) as f64,
                attended_weeks: present.len() as u32,
                absent_weeks: absent.len() as u32,
                points,
                goals_for,
                goals_against,
            }
        })
        .collect()
}

fn average(total: u32, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn roster(entries: &[(&str, &str)]) -> Vec<RosterEntry> {
        entries
            .iter()
            .map(|(p, t)| RosterEntry {
                player: p.to_string(),
                team: t.to_string(),
            })
            .collect()
    }

    fn att(player: &str, team: &str, week: u32, attended: bool) -> AttendanceRecord {
        AttendanceRecord {
            player: player.into(),
            team: team.into(),
            week,
            attended,
        }
    }

    fn pts(week: u32, team: &str, points: u32) -> WeeklyPointsRecord {
        WeeklyPointsRecord {
            week,
            team: team.into(),
            points_gained: points,
        }
    }

    fn gls(week: u32, team: &str, gf: u32, ga: u32) -> WeeklyGoalsRecord {
        WeeklyGoalsRecord {
            week,
            team: team.into(),
            goals_for: gf,
            goals_against: ga,
        }
    }

    fn teams() -> Vec<String> {
        vec!["Red".into(), "Blue".into()]
    }

    #[test]
    fn impact_stat_split() {
        let series: BTreeMap<u32, u32> = [(1, 3), (2, 0), (3, 1)].into_iter().collect();
        let present: BTreeSet<u32> = [1, 3].into_iter().collect();
        let absent: BTreeSet<u32> = [2].into_iter().collect();
        let s = ImpactStat::compute(&series, &present, &absent);
        assert_eq!(s.total_present, 4);
        assert_eq!(s.total_absent, 0);
        assert!((s.avg_present - 2.0).abs() < EPS);
        assert!((s.avg_absent - 0.0).abs() < EPS);
        assert!((s.impact - 2.0).abs() < EPS);
    }

    #[test]
    fn impact_stat_empty_sets_are_zero() {
        let series: BTreeMap<u32, u32> = [(1, 3)].into_iter().collect();
        let empty = BTreeSet::new();
        let s = ImpactStat::compute(&series, &empty, &empty);
        assert_eq!(s, ImpactStat::default());
    }

    #[test]
    fn presence_and_absence_impact() {
        let roster = roster(&[("kim", "Red")]);
        let attendance = vec![
            att("kim", "Red", 1, true),
            att("kim", "Red", 2, false),
            att("kim", "Red", 3, true),
        ];
        let points = vec![pts(1, "Red", 3), pts(2, "Red", 0), pts(3, "Red", 1), pts(3, "Red", 3)];
        let goals = vec![gls(1, "Red", 2, 0), gls(2, "Red", 0, 4), gls(3, "Red", 3, 3)];
        let tally = vec![PlayerGoalTally {
            player: "kim".into(),
            goals: 3,
        }];
        let match_teams = teams();

        let metrics = compute_metrics(MetricsInputs {
            roster: &roster,
            attendance: &attendance,
            player_goals: &tally,
            points_history: &points,
            goals_history: &goals,
            match_teams: &match_teams,
        });
        assert_eq!(metrics.len(), 1);
        let m = &metrics[0];
        assert_eq!(m.team.as_deref(), Some("Red"));
        assert_eq!(m.attendance_count, 2);
        assert_eq!(m.attended_weeks, 2);
        assert_eq!(m.absent_weeks, 1);
        assert!((m.goals_per_attendance - 1.5).abs() < EPS);

        // Week 3 has two rounds: 1 + 3 points.
        assert_eq!(m.points.total_present, 7);
        assert!((m.points_per_attendance() - 3.5).abs() < EPS);
        assert!((m.points.impact - 3.5).abs() < EPS);

        assert!((m.team_goals_per_attendance() - 2.5).abs() < EPS);
        assert!((m.goals_for.avg_absent - 0.0).abs() < EPS);
        assert!((m.team_conceded_per_attendance() - 1.5).abs() < EPS);
        assert!((m.goals_against.impact - (1.5 - 4.0)).abs() < EPS);
        assert!(m.is_impact_ranked());
    }

    #[test]
    fn never_absent_player_is_not_impact_ranked() {
        let roster = roster(&[("lee", "Blue")]);
        let attendance = vec![att("lee", "Blue", 1, true), att("lee", "Blue", 2, true)];
        let points = vec![pts(1, "Blue", 3), pts(2, "Blue", 1)];
        let match_teams = teams();

        let metrics = compute_metrics(MetricsInputs {
            roster: &roster,
            attendance: &attendance,
            player_goals: &[],
            points_history: &points,
            goals_history: &[],
            match_teams: &match_teams,
        });
        let m = &metrics[0];
        assert_eq!(m.absent_weeks, 0);
        assert!((m.points.avg_absent - 0.0).abs() < EPS);
        assert!((m.points.impact - m.points.avg_present).abs() < EPS);
        assert!(!m.is_impact_ranked());
    }

    #[test]
    fn scorer_without_roster_entry_gets_neutral_team_stats() {
        let tally = vec![PlayerGoalTally {
            player: "guest".into(),
            goals: 2,
        }];
        let points = vec![pts(1, "Red", 3)];
        let match_teams = teams();

        let metrics = compute_metrics(MetricsInputs {
            roster: &[],
            attendance: &[],
            player_goals: &tally,
            points_history: &points,
            goals_history: &[],
            match_teams: &match_teams,
        });
        let m = &metrics[0];
        assert_eq!(m.player, "guest");
        assert_eq!(m.team, None);
        assert_eq!(m.attendance_count, 0);
        assert_eq!(m.goals, 2);
        // Zero attendance divides by one.
        assert!((m.goals_per_attendance - 2.0).abs() < EPS);
        assert_eq!(m.points, ImpactStat::default());
        assert_eq!(m.absent_weeks, 1);
    }

    #[test]
    fn roster_player_without_goals_or_attendance() {
        let roster = roster(&[("park", "Red")]);
        let attendance = vec![att("park", "Red", 1, false)];
        let match_teams = teams();
        let metrics = compute_metrics(MetricsInputs {
            roster: &roster,
            attendance: &attendance,
            player_goals: &[],
            points_history: &[],
            goals_history: &[],
            match_teams: &match_teams,
        });
        let m = &metrics[0];
        assert_eq!(m.goals, 0);
        assert_eq!(m.attendance_count, 0);
        assert!((m.goals_per_attendance - 0.0).abs() < EPS);
    }

    #[test]
    fn first_roster_entry_wins_and_scorers_appended() {
        let roster = roster(&[("a", "Red"), ("b", "Blue"), ("a", "Blue")]);
        let tally = vec![
            PlayerGoalTally {
                player: "z".into(),
                goals: 5,
            },
            PlayerGoalTally {
                player: "a".into(),
                goals: 1,
            },
        ];
        let match_teams = teams();
        let metrics = compute_metrics(MetricsInputs {
            roster: &roster,
            attendance: &[],
            player_goals: &tally,
            points_history: &[],
            goals_history: &[],
            match_teams: &match_teams,
        });
        let names: Vec<&str> = metrics.iter().map(|m| m.player.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "z"]);
        assert_eq!(metrics[0].team.as_deref(), Some("Red"));
        assert_eq!(metrics[0].goals, 1);
    }

    #[test]
    fn resolve_team_exact_then_containment() {
        let teams = vec!["레드팀".to_string(), "블루".to_string()];
        assert_eq!(resolve_team("레드", &teams), Some("레드팀"));
        assert_eq!(resolve_team("블루", &teams), Some("블루"));
        assert_eq!(resolve_team("블루 FC", &teams), Some("블루"));
        assert_eq!(resolve_team("옐로", &teams), None);
        assert_eq!(resolve_team("", &teams), None);
    }

    #[test]
    fn attended_week_without_team_match_counts_as_zero() {
        let roster = roster(&[("kim", "Red")]);
        let attendance = vec![att("kim", "Red", 1, true), att("kim", "Red", 5, true)];
        let points = vec![pts(1, "Red", 3)];
        let match_teams = teams();
        let metrics = compute_metrics(MetricsInputs {
            roster: &roster,
            attendance: &attendance,
            player_goals: &[],
            points_history: &points,
            goals_history: &[],
            match_teams: &match_teams,
        });
        let m = &metrics[0];
        assert_eq!(m.attended_weeks, 2);
        assert!((m.points.avg_present - 1.5).abs() < EPS);
    }
}
