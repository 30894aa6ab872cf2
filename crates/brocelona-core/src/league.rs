// League state: the whole pipeline from typed sheets to derived statistics.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::attendance::{self, AttendanceRecord, RosterEntry};
use crate::metrics::{compute_metrics, MetricsInputs, PlayerMetrics};
use crate::schema::{AttendanceSheet, MatchSheet, RawTable, SchemaError, SheetSchema};
use crate::scorer::ScorerParser;
use crate::standings::{
    aggregate, GoalCreditPolicy, MatchResult, PlayerGoalTally, TeamStanding, WeeklyGoalsRecord,
    WeeklyPointsRecord,
};

/// Knobs that change how raw cells are scored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueOptions {
    pub parser: ScorerParser,
    pub goal_credit: GoalCreditPolicy,
}

/// Everything derived from one load of the two sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeagueState {
    /// Team columns in sheet order.
    pub teams: Vec<String>,
    pub standings: Vec<TeamStanding>,
    pub points_history: Vec<WeeklyPointsRecord>,
    pub goals_history: Vec<WeeklyGoalsRecord>,
    pub results: Vec<MatchResult>,
    pub player_goals: Vec<PlayerGoalTally>,
    pub attendance: Vec<AttendanceRecord>,
    pub roster: Vec<RosterEntry>,
    pub players: Vec<PlayerMetrics>,
    /// Weeks with at least one counted round, ascending.
    pub league_weeks: Vec<u32>,
}

impl LeagueState {
    /// Map both raw tables onto their schema, then compute.
    pub fn from_raw(
        matches: &RawTable,
        attendance: &RawTable,
        schema: &SheetSchema,
        options: &LeagueOptions,
    ) -> Result<Self, SchemaError> {
        let match_sheet = MatchSheet::from_raw(matches, schema)?;
        let attendance_sheet = AttendanceSheet::from_raw(attendance, schema)?;
        Ok(compute_league_state(&match_sheet, &attendance_sheet, options))
    }

    pub fn standing(&self, team: &str) -> Option<&TeamStanding> {
        self.standings.iter().find(|s| s.team == team)
    }

    pub fn player(&self, name: &str) -> Option<&PlayerMetrics> {
        self.players.iter().find(|p| p.player == name)
    }

    /// Rounds that counted for the table.
    pub fn counted_rounds(&self) -> usize {
        self.results.iter().filter(|r| r.counted).count()
    }
}

/// Recompute the league from scratch. No state survives between calls.
pub fn compute_league_state(
    matches: &MatchSheet,
    attendance_sheet: &AttendanceSheet,
    options: &LeagueOptions,
) -> LeagueState {
    let season = aggregate(matches, &options.parser, options.goal_credit);
    let attendance = attendance::normalize(attendance_sheet);
    let roster = attendance::roster(attendance_sheet);

    let players = compute_metrics(MetricsInputs {
        roster: &roster,
        attendance: &attendance,
        player_goals: &season.player_goals,
        points_history: &season.points_history,
        goals_history: &season.goals_history,
        match_teams: &matches.teams,
    });

    let league_weeks: Vec<u32> = season
        .points_history
        .iter()
        .map(|h| h.week)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let state = LeagueState {
        teams: matches.teams.clone(),
        standings: season.standings,
        points_history: season.points_history,
        goals_history: season.goals_history,
        results: season.results,
        player_goals: season.player_goals,
        attendance,
        roster,
        players,
        league_weeks,
    };

    info!(
        teams = state.teams.len(),
        rounds = state.results.len(),
        counted = state.counted_rounds(),
        weeks = state.league_weeks.len(),
        players = state.players.len(),
        "league state computed"
    );
    state
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
