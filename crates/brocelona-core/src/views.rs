// Presentation tables derived from a `LeagueState`.
//
// Every function here is a pure projection; the dashboard renders these rows
// as-is and does no arithmetic of its own.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::league::LeagueState;
use crate::metrics::{ImpactStat, PlayerMetrics};
use crate::standings::{MatchResult, TeamResult};

// ---------------------------------------------------------------------------
// Weekly tables
// ---------------------------------------------------------------------------

/// Row key of the week-indexed tables: a season total followed by weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowKey {
    Total,
    Week(u32),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Total => write!(f, "Total"),
            RowKey::Week(w) => write!(f, "Week {w}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsRow {
    pub key: RowKey,
    /// One value per team, in `PointsTable::teams` order.
    pub values: Vec<u32>,
}

/// Points per team per week, with the season total on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsTable {
    pub teams: Vec<String>,
    pub rows: Vec<PointsRow>,
}

pub fn weekly_points_table(state: &LeagueState) -> PointsTable {
    let team_index = index_of(&state.teams);
    let mut by_week: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for h in &state.points_history {
        if let Some(&i) = team_index.get(h.team.as_str()) {
            by_week.entry(h.week).or_insert_with(|| vec![0; state.teams.len()])[i] +=
                h.points_gained;
        }
    }

    let totals = state
        .teams
        .iter()
        .map(|t| state.standing(t).map(|s| s.points).unwrap_or(0))
        .collect();

    let mut rows = vec![PointsRow {
        key: RowKey::Total,
        values: totals,
    }];
    rows.extend(by_week.into_iter().rev().map(|(week, values)| PointsRow {
        key: RowKey::Week(week),
        values,
    }));

    PointsTable {
        teams: state.teams.clone(),
        rows,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalsRow {
    pub key: RowKey,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
}

impl GoalsRow {
    fn new(key: RowKey, goals_for: u32, goals_against: u32) -> Self {
        GoalsRow {
            key,
            goals_for,
            goals_against,
            goal_difference: goals_for as i64 - goals_against as i64,
        }
    }
}

/// Goals scored and conceded by one team: total, then every week it played,
/// latest first.
pub fn team_goals_breakdown(state: &LeagueState, team: &str) -> Vec<GoalsRow> {
    let mut by_week: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
    for g in state.goals_history.iter().filter(|g| g.team == team) {
        let slot = by_week.entry(g.week).or_insert((0, 0));
        slot.0 += g.goals_for;
        slot.1 += g.goals_against;
    }
    let (gf, ga) = by_week
        .values()
        .fold((0, 0), |(f, a), (gf, ga)| (f + gf, a + ga));

    let mut rows = vec![GoalsRow::new(RowKey::Total, gf, ga)];
    rows.extend(
        by_week
            .into_iter()
            .rev()
            .map(|(week, (gf, ga))| GoalsRow::new(RowKey::Week(week), gf, ga)),
    );
    rows
}

// ---------------------------------------------------------------------------
// Match log
// ---------------------------------------------------------------------------

/// Cell shown for a team that sat a round out.
pub const NOT_PLAYED: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundLine {
    pub round: Option<u32>,
    pub counted: bool,
    /// One cell per team, in `LeagueState::teams` order.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchDay {
    pub week: u32,
    pub rounds: Vec<RoundLine>,
    /// Points each team gained over the week.
    pub points: Vec<u32>,
}

/// Rounds grouped by week, latest week first; rounds keep sheet order.
pub fn match_days(state: &LeagueState) -> Vec<MatchDay> {
    let team_index = index_of(&state.teams);
    let mut days: BTreeMap<u32, MatchDay> = BTreeMap::new();

    for result in &state.results {
        let day = days.entry(result.week).or_insert_with(|| MatchDay {
            week: result.week,
            rounds: Vec::new(),
            points: vec![0; state.teams.len()],
        });
        day.rounds.push(round_line(result));
    }
    for h in &state.points_history {
        if let (Some(day), Some(&i)) = (days.get_mut(&h.week), team_index.get(h.team.as_str())) {
            day.points[i] += h.points_gained;
        }
    }

    days.into_values().rev().collect()
}

fn round_line(result: &MatchResult) -> RoundLine {
    RoundLine {
        round: result.round,
        counted: result.counted,
        cells: result.entries.iter().map(result_cell).collect(),
    }
}

/// "W (a, b)", "D", "L (c)"; a participating team in an uncounted round
/// shows its goal count instead of an outcome.
pub fn result_cell(entry: &TeamResult) -> String {
    let Some(goals) = entry.goals else {
        return NOT_PLAYED.to_string();
    };
    let head = match entry.outcome {
        Some(outcome) => outcome.label().to_string(),
        None => goals.to_string(),
    };
    if entry.scorers.is_empty() {
        head
    } else {
        format!("{head} ({})", entry.scorers.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

/// The player rankings the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Leaderboard {
    GoldenBoot,
    Attendance,
    EfficientStriker,
    PointsFairy,
    PointsImpact,
    AttackImpact,
    DefenseImpact,
}

impl Leaderboard {
    pub const ALL: [Leaderboard; 7] = [
        Leaderboard::GoldenBoot,
        Leaderboard::Attendance,
        Leaderboard::EfficientStriker,
        Leaderboard::PointsFairy,
        Leaderboard::PointsImpact,
        Leaderboard::AttackImpact,
        Leaderboard::DefenseImpact,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Leaderboard::GoldenBoot => "Golden Boot",
            Leaderboard::Attendance => "Attendance",
            Leaderboard::EfficientStriker => "Efficient Striker",
            Leaderboard::PointsFairy => "Points Fairy",
            Leaderboard::PointsImpact => "Points Impact",
            Leaderboard::AttackImpact => "Attack Impact",
            Leaderboard::DefenseImpact => "Defense Impact",
        }
    }

    /// Header of the value column.
    pub fn value_label(&self) -> &'static str {
        match self {
            Leaderboard::GoldenBoot => "Goals",
            Leaderboard::Attendance => "Apps",
            Leaderboard::EfficientStriker => "Goals/App",
            Leaderboard::PointsFairy => "Pts/App",
            Leaderboard::PointsImpact => "Pts +/-",
            Leaderboard::AttackImpact => "GF +/-",
            Leaderboard::DefenseImpact => "GA +/-",
        }
    }

    pub fn next(&self) -> Self {
        let i = self.position();
        Leaderboard::ALL[(i + 1) % Leaderboard::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = self.position();
        Leaderboard::ALL[(i + Leaderboard::ALL.len() - 1) % Leaderboard::ALL.len()]
    }

    fn position(&self) -> usize {
        Leaderboard::ALL
            .iter()
            .position(|b| b == self)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub player: String,
    pub team: Option<String>,
    pub value: f64,
    /// Formatted `value`.
    pub display: String,
    /// Supporting figures, e.g. goals and appearances behind a ratio.
    pub detail: String,
}

/// Rank players for `board`, keeping at most `limit` rows. Equal values keep
/// the roster order of `LeagueState::players`.
pub fn leaderboard(state: &LeagueState, board: Leaderboard, limit: usize) -> Vec<LeaderboardRow> {
    let mut entries: Vec<(&PlayerMetrics, f64)> = state
        .players
        .iter()
        .filter(|p| eligible(board, p))
        .map(|p| (p, board_value(board, p)))
        .collect();

    match board {
        Leaderboard::DefenseImpact => entries.sort_by(|a, b| a.1.total_cmp(&b.1)),
        _ => entries.sort_by(|a, b| b.1.total_cmp(&a.1)),
    }

    entries
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (p, value))| LeaderboardRow {
            rank: i + 1,
            player: p.player.clone(),
            team: p.team.clone(),
            value,
            display: display_value(board, value),
            detail: detail(board, p),
        })
        .collect()
}

fn eligible(board: Leaderboard, p: &PlayerMetrics) -> bool {
    match board {
        Leaderboard::GoldenBoot => p.goals > 0,
        Leaderboard::Attendance => true,
        Leaderboard::EfficientStriker | Leaderboard::PointsFairy => p.attendance_count > 0,
        Leaderboard::PointsImpact | Leaderboard::AttackImpact | Leaderboard::DefenseImpact => {
            p.is_impact_ranked()
        }
    }
}

fn board_value(board: Leaderboard, p: &PlayerMetrics) -> f64 {
    match board {
        Leaderboard::GoldenBoot => p.goals as f64,
        Leaderboard::Attendance => p.attendance_count as f64,
        Leaderboard::EfficientStriker => p.goals_per_attendance,
        Leaderboard::PointsFairy => p.points_per_attendance(),
        Leaderboard::PointsImpact => p.points.impact,
        Leaderboard::AttackImpact => p.goals_for.impact,
        Leaderboard::DefenseImpact => p.goals_against.impact,
    }
}

fn display_value(board: Leaderboard, value: f64) -> String {
    match board {
        Leaderboard::GoldenBoot | Leaderboard::Attendance => format!("{value:.0}"),
        Leaderboard::EfficientStriker | Leaderboard::PointsFairy => format!("{value:.2}"),
        _ => format!("{value:+.2}"),
    }
}

fn detail(board: Leaderboard, p: &PlayerMetrics) -> String {
    let impact = |s: &ImpactStat| {
        format!(
            "{:.2} in / {:.2} out ({}/{} wks)",
            s.avg_present, s.avg_absent, p.attended_weeks, p.absent_weeks
        )
    };
    match board {
        Leaderboard::GoldenBoot => format!("{} apps", p.attendance_count),
        Leaderboard::Attendance => format!("{} goals", p.goals),
        Leaderboard::EfficientStriker => {
            format!("{} goals / {} apps", p.goals, p.attendance_count)
        }
        Leaderboard::PointsFairy => {
            format!("{} pts / {} wks", p.points.total_present, p.attended_weeks)
        }
        Leaderboard::PointsImpact => impact(&p.points),
        Leaderboard::AttackImpact => impact(&p.goals_for),
        Leaderboard::DefenseImpact => impact(&p.goals_against),
    }
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendSeries {
    pub team: String,
    /// `(week, running points total)` for every league week, ascending.
    pub points: Vec<(u32, u32)>,
}

/// Running points per team across league weeks. A week a team sat out
/// repeats its previous total.
pub fn cumulative_points(state: &LeagueState) -> Vec<TrendSeries> {
    let mut gained: HashMap<(&str, u32), u32> = HashMap::new();
    for h in &state.points_history {
        *gained.entry((h.team.as_str(), h.week)).or_insert(0) += h.points_gained;
    }

    state
        .teams
        .iter()
        .map(|team| {
            let mut running = 0;
            let points = state
                .league_weeks
                .iter()
                .map(|&week| {
                    running += gained.get(&(team.as_str(), week)).copied().unwrap_or(0);
                    (week, running)
                })
                .collect();
            TrendSeries {
                team: team.clone(),
                points,
            }
        })
        .collect()
}

fn index_of(teams: &[String]) -> HashMap<&str, usize> {
    teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::{compute_league_state, LeagueOptions};
    use crate::schema::{AttendanceRow, AttendanceSheet, MatchRecord, MatchSheet, WeekColumn};
    use crate::standings::Outcome;

    fn record(week: u32, round: u32, fields: [&str; 3]) -> MatchRecord {
        MatchRecord {
            week,
            round: Some(round),
            fields: fields
                .iter()
                .map(|f| if f.is_empty() { None } else { Some(f.to_string()) })
                .collect(),
        }
    }

    fn week(w: u32) -> WeekColumn {
        WeekColumn {
            label: format!("{w}주차"),
            week: w,
        }
    }

    fn row(team: &str, player: &str, marks: [&str; 3]) -> AttendanceRow {
        AttendanceRow {
            team: team.into(),
            player: player.into(),
            marks: marks
                .iter()
                .map(|m| if m.is_empty() { None } else { Some(m.to_string()) })
                .collect(),
        }
    }

    /// Three weeks:
    ///   W1: Red 2-0 Blue; Blue 1-1 Yellow
    ///   W2: Red alone (uncounted); Red 0, Blue 1, Yellow 0
    ///   W3: Yellow 3-0 Red
    fn state() -> LeagueState {
        let matches = MatchSheet::new(
            vec!["Red".into(), "Blue".into(), "Yellow".into()],
            vec![
                record(1, 1, ["kim,kim", "0", ""]),
                record(1, 2, ["", "lee", "park"]),
                record(2, 1, ["kim", "", ""]),
                record(2, 2, ["0", "lee", "0"]),
                record(3, 1, ["0", "", "park,choi,자살골"]),
            ],
        );
        let attendance = AttendanceSheet::new(
            vec![week(1), week(2), week(3)],
            vec![
                row("Red", "kim", ["1", "1", ""]),
                row("Blue", "lee", ["1", "", "1"]),
                row("Yellow", "park", ["1", "1", "1"]),
                row("Yellow", "choi", ["", "", "1"]),
                row("Red", "bench", ["", "", ""]),
            ],
        );
        compute_league_state(&matches, &attendance, &LeagueOptions::default())
    }

    #[test]
    fn row_key_labels() {
        assert_eq!(RowKey::Total.to_string(), "Total");
        assert_eq!(RowKey::Week(7).to_string(), "Week 7");
    }

    #[test]
    fn weekly_points_total_then_weeks_descending() {
        let table = weekly_points_table(&state());
        assert_eq!(table.teams, vec!["Red", "Blue", "Yellow"]);
        let keys: Vec<RowKey> = table.rows.iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            vec![RowKey::Total, RowKey::Week(3), RowKey::Week(2), RowKey::Week(1)]
        );
        assert_eq!(table.rows[0].values, vec![3, 4, 4]);
        assert_eq!(table.rows[3].values, vec![3, 1, 1]);
        assert_eq!(table.rows[2].values, vec![0, 3, 0]);

        // Week rows add up to the total row.
        for (i, total) in table.rows[0].values.iter().enumerate() {
            let sum: u32 = table.rows[1..].iter().map(|r| r.values[i]).sum();
            assert_eq!(sum, *total);
        }
    }

    #[test]
    fn team_goals_breakdown_rows() {
        let rows = team_goals_breakdown(&state(), "Red");
        assert_eq!(rows[0], GoalsRow::new(RowKey::Total, 2, 4));
        assert_eq!(rows[0].goal_difference, -2);
        assert_eq!(rows[1], GoalsRow::new(RowKey::Week(3), 0, 3));
        assert_eq!(rows[2], GoalsRow::new(RowKey::Week(2), 0, 1));
        assert_eq!(rows[3], GoalsRow::new(RowKey::Week(1), 2, 0));
        assert!(team_goals_breakdown(&state(), "Nobody")[0].key == RowKey::Total);
    }

    #[test]
    fn match_days_latest_first_with_cells() {
        let days = match_days(&state());
        let weeks: Vec<u32> = days.iter().map(|d| d.week).collect();
        assert_eq!(weeks, vec![3, 2, 1]);

        let w1 = &days[2];
        assert_eq!(w1.rounds[0].cells, vec!["W (kim, kim)", "L", "-"]);
        assert_eq!(w1.rounds[1].cells, vec!["-", "D (lee)", "D (park)"]);
        assert_eq!(w1.points, vec![3, 1, 1]);

        let w2 = &days[1];
        assert!(!w2.rounds[0].counted);
        assert_eq!(w2.rounds[0].cells, vec!["1 (kim)", "-", "-"]);
        assert_eq!(w2.rounds[1].cells, vec!["L", "W (lee)", "L"]);

        // Own goal counts toward the result but is not listed.
        assert_eq!(days[0].rounds[0].cells, vec!["L", "-", "W (park, choi)"]);
    }

    #[test]
    fn result_cell_formats() {
        let entry = |goals, scorers: &[&str], outcome| TeamResult {
            team: "Red".into(),
            goals,
            scorers: scorers.iter().map(|s| s.to_string()).collect(),
            outcome,
        };
        assert_eq!(result_cell(&entry(None, &[], None)), "-");
        assert_eq!(result_cell(&entry(Some(0), &[], Some(Outcome::Draw))), "D");
        assert_eq!(
            result_cell(&entry(Some(2), &["a", "b"], Some(Outcome::Win))),
            "W (a, b)"
        );
        assert_eq!(result_cell(&entry(Some(0), &[], None)), "0");
    }

    #[test]
    fn golden_boot_only_scorers() {
        let rows = leaderboard(&state(), Leaderboard::GoldenBoot, 10);
        let names: Vec<&str> = rows.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(names, vec!["kim", "lee", "park", "choi"]);
        assert_eq!(rows[0].display, "3");
        assert_eq!(rows[0].rank, 1);
        assert!(rows.iter().all(|r| r.value > 0.0));
    }

    #[test]
    fn leaderboard_limit() {
        let rows = leaderboard(&state(), Leaderboard::GoldenBoot, 2);
        assert_eq!(rows.len(), 2);
        assert!(leaderboard(&state(), Leaderboard::Attendance, 0).is_empty());
    }

    #[test]
    fn attendance_board_includes_absentees_last() {
        let rows = leaderboard(&state(), Leaderboard::Attendance, 10);
        assert_eq!(rows[0].player, "park");
        assert_eq!(rows.last().map(|r| r.player.as_str()), Some("bench"));
    }

    #[test]
    fn ratio_boards_skip_zero_attendance() {
        for board in [Leaderboard::EfficientStriker, Leaderboard::PointsFairy] {
            let rows = leaderboard(&state(), board, 10);
            assert!(rows.iter().all(|r| r.player != "bench"), "{board:?}");
        }
        let rows = leaderboard(&state(), Leaderboard::EfficientStriker, 10);
        assert_eq!(rows[0].player, "kim");
        assert_eq!(rows[0].display, "1.50");
    }

    #[test]
    fn impact_boards_need_presence_and_absence() {
        let s = state();
        for board in [
            Leaderboard::PointsImpact,
            Leaderboard::AttackImpact,
            Leaderboard::DefenseImpact,
        ] {
            for row in leaderboard(&s, board, 10) {
                assert!(s.player(&row.player).unwrap().is_impact_ranked());
            }
        }
        // park attended every week, bench none.
        let names: Vec<String> = leaderboard(&s, Leaderboard::PointsImpact, 10)
            .into_iter()
            .map(|r| r.player)
            .collect();
        assert!(!names.contains(&"park".to_string()));
        assert!(!names.contains(&"bench".to_string()));
    }

    #[test]
    fn defense_impact_sorted_ascending() {
        let rows = leaderboard(&state(), Leaderboard::DefenseImpact, 10);
        for pair in rows.windows(2) {
            assert!(pair[0].value <= pair[1].value);
        }
        let rows = leaderboard(&state(), Leaderboard::PointsImpact, 10);
        for pair in rows.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }
    }

    #[test]
    fn board_cycling_wraps() {
        assert_eq!(Leaderboard::GoldenBoot.next(), Leaderboard::Attendance);
        assert_eq!(Leaderboard::DefenseImpact.next(), Leaderboard::GoldenBoot);
        assert_eq!(Leaderboard::GoldenBoot.prev(), Leaderboard::DefenseImpact);
        for board in Leaderboard::ALL {
            assert_eq!(board.next().prev(), board);
        }
    }

    #[test]
    fn cumulative_points_runs_over_league_weeks() {
        let trend = cumulative_points(&state());
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].team, "Red");
        assert_eq!(trend[0].points, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(trend[1].points, vec![(1, 1), (2, 4), (3, 4)]);
        assert_eq!(trend[2].points, vec![(1, 1), (2, 1), (3, 4)]);

        let s = state();
        for series in &trend {
            let last = series.points.last().map(|p| p.1).unwrap_or(0);
            assert_eq!(last, s.standing(&series.team).unwrap().points);
        }
    }
}
