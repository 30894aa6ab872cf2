// Match aggregation: standings, weekly history and individual goal tallies.
//
// Rounds may have two or three teams on the pitch at once. Each participating
// team is judged against the best opponent score in its round, and concedes
// the sum of every opponent's goals.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::MatchSheet;
use crate::scorer::ScorerParser;

/// A round needs at least this many participating teams to count.
pub const MIN_PARTICIPANTS: usize = 2;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Result of one team in one counted round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// Decide the outcome for a team scoring `goals` against opponents whose
    /// best score is `max_opponent`.
    pub fn judge(goals: u32, max_opponent: u32) -> Self {
        match goals.cmp(&max_opponent) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Loss,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            Outcome::Win => 3,
            Outcome::Draw => 1,
            Outcome::Loss => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Win => "W",
            Outcome::Draw => "D",
            Outcome::Loss => "L",
        }
    }
}

/// When an individual is credited with a goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCreditPolicy {
    /// Whenever the scorer's team has a non-blank field, even in a round
    /// that does not count for the table.
    #[default]
    Participating,
    /// Only in rounds that count for the table.
    CountedMatches,
}

/// One row of the league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStanding {
    /// 1-based position after sorting.
    pub rank: usize,
    pub team: String,
    pub points: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub played: u32,
}

/// Points a team gained in one counted round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyPointsRecord {
    pub week: u32,
    pub team: String,
    pub points_gained: u32,
}

/// Goals a team scored and conceded in one counted round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyGoalsRecord {
    pub week: u32,
    pub team: String,
    pub goals_for: u32,
    pub goals_against: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerGoalTally {
    pub player: String,
    pub goals: u32,
}

/// One team's line in a round, as shown in the match log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamResult {
    pub team: String,
    /// `None` when the team did not play the round.
    pub goals: Option<u32>,
    pub scorers: Vec<String>,
    /// Set only for participating teams of a counted round.
    pub outcome: Option<Outcome>,
}

/// A single round after parsing, whether or not it counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub week: u32,
    pub round: Option<u32>,
    pub counted: bool,
    pub entries: Vec<TeamResult>,
}

impl MatchResult {
    pub fn participants(&self) -> usize {
        self.entries.iter().filter(|e| e.goals.is_some()).count()
    }
}

/// Everything the aggregation pass produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeasonAggregate {
    pub standings: Vec<TeamStanding>,
    pub points_history: Vec<WeeklyPointsRecord>,
    pub goals_history: Vec<WeeklyGoalsRecord>,
    pub results: Vec<MatchResult>,
    pub player_goals: Vec<PlayerGoalTally>,
}

// ---------------------------------------------------------------------------
// Internal accumulator
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
struct TeamTotals {
    points: u32,
    wins: u32,
    draws: u32,
    losses: u32,
    goals_for: u32,
    goals_against: u32,
    played: u32,
}

impl TeamTotals {
    fn record(&mut self, goals_for: u32, goals_against: u32, outcome: Outcome) {
        self.goals_for += goals_for;
        self.goals_against += goals_against;
        self.played += 1;
        self.points += outcome.points();
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Loss => self.losses += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Run the full-season aggregation over every round of the match sheet.
pub fn aggregate(
    sheet: &MatchSheet,
    parser: &ScorerParser,
    policy: GoalCreditPolicy,
) -> SeasonAggregate {
    let mut totals = vec![TeamTotals::default(); sheet.teams.len()];
    let mut points_history = Vec::new();
    let mut goals_history = Vec::new();
    let mut results = Vec::with_capacity(sheet.records.len());
    let mut tally: HashMap<String, u32> = HashMap::new();

    for record in &sheet.records {
        let parsed: Vec<_> = (0..sheet.teams.len())
            .map(|i| parser.parse(record.field(i)))
            .collect();
        let participants: Vec<(usize, u32)> = parsed
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.goals.map(|g| (i, g)))
            .collect();
        let counted = participants.len() >= MIN_PARTICIPANTS;

        if !counted {
            debug!(
                week = record.week,
                round = ?record.round,
                participants = participants.len(),
                "round skipped: not enough participating teams"
            );
        }

        let mut outcomes: Vec<Option<Outcome>> = vec![None; sheet.teams.len()];
        if counted {
            for &(i, goals) in &participants {
                let opponents = participants.iter().filter(|(j, _)| *j != i).map(|(_, g)| *g);
                let conceded: u32 = opponents.clone().sum();
                let max_opponent = opponents.max().unwrap_or(0);
                let outcome = Outcome::judge(goals, max_opponent);

                totals[i].record(goals, conceded, outcome);
                outcomes[i] = Some(outcome);

                points_history.push(WeeklyPointsRecord {
                    week: record.week,
                    team: sheet.teams[i].clone(),
                    points_gained: outcome.points(),
                });
                goals_history.push(WeeklyGoalsRecord {
                    week: record.week,
                    team: sheet.teams[i].clone(),
                    goals_for: goals,
                    goals_against: conceded,
                });
            }
        }

        let credit = match policy {
            GoalCreditPolicy::Participating => true,
            GoalCreditPolicy::CountedMatches => counted,
        };
        if credit {
            for r in parsed.iter().filter(|r| r.participated()) {
                for name in &r.scorers {
                    *tally.entry(name.clone()).or_insert(0) += 1;
                }
            }
        }

        results.push(MatchResult {
            week: record.week,
            round: record.round,
            counted,
            entries: parsed
                .into_iter()
                .zip(outcomes)
                .zip(&sheet.teams)
                .map(|((r, outcome), team)| TeamResult {
                    team: team.clone(),
                    goals: r.goals,
                    scorers: r.scorers,
                    outcome,
                })
                .collect(),
        });
    }

    let standings = rank_teams(&sheet.teams, &totals);

    let mut player_goals: Vec<PlayerGoalTally> = tally
        .into_iter()
        .map(|(player, goals)| PlayerGoalTally { player, goals })
        .collect();
    player_goals.sort_by(|a, b| b.goals.cmp(&a.goals).then_with(|| a.player.cmp(&b.player)));

    SeasonAggregate {
        standings,
        points_history,
        goals_history,
        results,
        player_goals,
    }
}

/// Build the ranked table: points, then goal difference, then goals for.
/// Teams level on all three keep their sheet order.
fn rank_teams(teams: &[String], totals: &[TeamTotals]) -> Vec<TeamStanding> {
    let mut table: Vec<TeamStanding> = teams
        .iter()
        .zip(totals)
        .map(|(team, t)| TeamStanding {
            rank: 0,
            team: team.clone(),
            points: t.points,
            wins: t.wins,
            draws: t.draws,
            losses: t.losses,
            goals_for: t.goals_for,
            goals_against: t.goals_against,
            goal_difference: t.goals_for as i64 - t.goals_against as i64,
            played: t.played,
        })
        .collect();

    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.goal_difference.cmp(&a.goal_difference))
            .then_with(|| b.goals_for.cmp(&a.goals_for))
    });
    for (i, row) in table.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    table
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MatchRecord;

    fn teams() -> Vec<String> {
        vec!["Red".into(), "Blue".into(), "Yellow".into()]
    }

    fn record(week: u32, round: u32, fields: [&str; 3]) -> MatchRecord {
        MatchRecord {
            week,
            round: Some(round),
            fields: fields
                .iter()
                .map(|f| if f.trim().is_empty() { None } else { Some(f.to_string()) })
                .collect(),
        }
    }

    fn run(records: Vec<MatchRecord>) -> SeasonAggregate {
        aggregate(
            &MatchSheet::new(teams(), records),
            &ScorerParser::default(),
            GoalCreditPolicy::default(),
        )
    }

    fn standing<'a>(agg: &'a SeasonAggregate, team: &str) -> &'a TeamStanding {
        agg.standings.iter().find(|s| s.team == team).unwrap()
    }

    #[test]
    fn outcome_judgement() {
        assert_eq!(Outcome::judge(2, 1), Outcome::Win);
        assert_eq!(Outcome::judge(1, 1), Outcome::Draw);
        assert_eq!(Outcome::judge(0, 0), Outcome::Draw);
        assert_eq!(Outcome::judge(0, 3), Outcome::Loss);
        assert_eq!(Outcome::Win.points(), 3);
        assert_eq!(Outcome::Draw.points(), 1);
        assert_eq!(Outcome::Loss.points(), 0);
    }

    #[test]
    fn two_team_round_example() {
        let agg = run(vec![record(1, 1, ["p1,p1", "0", ""])]);

        let red = standing(&agg, "Red");
        assert_eq!((red.points, red.wins, red.goals_for, red.goals_against), (3, 1, 2, 0));
        assert_eq!(red.played, 1);

        let blue = standing(&agg, "Blue");
        assert_eq!((blue.points, blue.losses, blue.goals_for, blue.goals_against), (0, 1, 0, 2));

        let yellow = standing(&agg, "Yellow");
        assert_eq!(yellow.played, 0);

        assert_eq!(agg.points_history.len(), 2);
        assert_eq!(
            agg.player_goals,
            vec![PlayerGoalTally {
                player: "p1".into(),
                goals: 2
            }]
        );
    }

    #[test]
    fn three_team_round_concedes_sum_of_opponents() {
        let agg = run(vec![record(1, 1, ["a,b", "c", "d,e,f"])]);
        assert_eq!(standing(&agg, "Red").goals_against, 4);
        assert_eq!(standing(&agg, "Blue").goals_against, 5);
        assert_eq!(standing(&agg, "Yellow").goals_against, 3);

        assert_eq!(standing(&agg, "Yellow").wins, 1);
        assert_eq!(standing(&agg, "Red").losses, 1);
        assert_eq!(standing(&agg, "Blue").losses, 1);
    }

    #[test]
    fn shared_top_score_is_a_draw_for_both() {
        let agg = run(vec![record(1, 1, ["a,b", "c,d", "0"])]);
        assert_eq!(standing(&agg, "Red").draws, 1);
        assert_eq!(standing(&agg, "Blue").draws, 1);
        assert_eq!(standing(&agg, "Yellow").losses, 1);
        let points: u32 = agg.points_history.iter().map(|h| h.points_gained).sum();
        assert_eq!(points, 2);
    }

    #[test]
    fn three_way_goalless_tie() {
        let agg = run(vec![record(1, 1, ["0", "0", "0"])]);
        for team in teams() {
            let s = standing(&agg, &team);
            assert_eq!((s.draws, s.points), (1, 1));
        }
    }

    #[test]
    fn single_participant_round_skipped() {
        let agg = run(vec![record(1, 1, ["a,b", "", ""])]);
        for s in &agg.standings {
            assert_eq!((s.points, s.played, s.goals_for, s.goals_against), (0, 0, 0, 0));
        }
        assert!(agg.points_history.is_empty());
        assert!(agg.goals_history.is_empty());
        assert_eq!(agg.results.len(), 1);
        assert!(!agg.results[0].counted);
        assert_eq!(agg.results[0].entries[0].outcome, None);
    }

    #[test]
    fn goal_credit_policy_on_skipped_rounds() {
        let sheet = MatchSheet::new(teams(), vec![record(1, 1, ["a", "", ""])]);
        let parser = ScorerParser::default();

        let lenient = aggregate(&sheet, &parser, GoalCreditPolicy::Participating);
        assert_eq!(lenient.player_goals.len(), 1);
        assert_eq!(lenient.player_goals[0].goals, 1);

        let strict = aggregate(&sheet, &parser, GoalCreditPolicy::CountedMatches);
        assert!(strict.player_goals.is_empty());
    }

    #[test]
    fn own_goals_count_for_team_only() {
        let agg = run(vec![record(1, 1, ["a,자살골", "b", ""])]);
        assert_eq!(standing(&agg, "Red").goals_for, 2);
        assert_eq!(standing(&agg, "Red").wins, 1);
        let names: Vec<&str> = agg.player_goals.iter().map(|p| p.player.as_str()).collect();
        assert!(!names.iter().any(|n| n.contains("자살골")));
    }

    #[test]
    fn points_equal_three_wins_plus_draws() {
        let agg = run(vec![
            record(1, 1, ["a", "0", ""]),
            record(1, 2, ["", "b", "c"]),
            record(2, 1, ["d,e", "f", "g,h"]),
            record(2, 2, ["0", "", "0"]),
            record(3, 1, ["i", "j,k", "l"]),
        ]);
        for s in &agg.standings {
            assert_eq!(s.points, 3 * s.wins + s.draws);
            assert_eq!(s.played, s.wins + s.draws + s.losses);
            assert_eq!(s.goal_difference, s.goals_for as i64 - s.goals_against as i64);
        }
        assert!(agg.points_history.iter().all(|h| [0, 1, 3].contains(&h.points_gained)));
    }

    #[test]
    fn goals_against_matches_opponent_goals_per_round() {
        let agg = run(vec![record(4, 1, ["a,b,c", "d", "e,f"])]);
        let total_for: u32 = agg.goals_history.iter().map(|g| g.goals_for).sum();
        for g in &agg.goals_history {
            assert_eq!(g.goals_against, total_for - g.goals_for);
        }
    }

    #[test]
    fn standings_sorted_by_points_then_gd_then_gf() {
        // All three finish on 3 points: Blue +2, Yellow +1, Red -3.
        let agg = run(vec![
            record(1, 1, ["a", "0", ""]),
            record(2, 1, ["", "a,b,c", "0"]),
            record(3, 1, ["0", "", "a,b,c,d"]),
        ]);
        let order: Vec<&str> = agg.standings.iter().map(|s| s.team.as_str()).collect();
        assert_eq!(order, vec!["Blue", "Yellow", "Red"]);
        let ranks: Vec<usize> = agg.standings.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        for pair in agg.standings.windows(2) {
            let a = (pair[0].points, pair[0].goal_difference, pair[0].goals_for);
            let b = (pair[1].points, pair[1].goal_difference, pair[1].goals_for);
            assert!(a >= b);
        }
    }

    #[test]
    fn full_ties_keep_sheet_order() {
        let agg = run(vec![]);
        let order: Vec<&str> = agg.standings.iter().map(|s| s.team.as_str()).collect();
        assert_eq!(order, vec!["Red", "Blue", "Yellow"]);
    }

    #[test]
    fn multiple_rounds_in_a_week_append_separate_history() {
        let agg = run(vec![record(1, 1, ["a", "0", ""]), record(1, 2, ["b", "", "0"])]);
        let red_week1: Vec<_> = agg
            .points_history
            .iter()
            .filter(|h| h.team == "Red" && h.week == 1)
            .collect();
        assert_eq!(red_week1.len(), 2);
    }

    #[test]
    fn player_tally_sorted_by_goals_then_name() {
        let agg = run(vec![record(1, 1, ["b,a", "c,c,c", "a"])]);
        let tally: Vec<(&str, u32)> = agg
            .player_goals
            .iter()
            .map(|p| (p.player.as_str(), p.goals))
            .collect();
        assert_eq!(tally, vec![("c", 3), ("a", 2), ("b", 1)]);
    }
}
