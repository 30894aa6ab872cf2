// Scorer field parsing.
//
// Each team cell of the match sheet is free text:
//   ""            the team did not play this round
//   "0" / "0.0"   the team played and did not score
//   "a, b, a"     one entry per goal, in order; own goals carry a marker

use serde::Serialize;

/// Marker used by the league sheet to tag an own goal ("자살골").
pub const DEFAULT_OWN_GOAL_MARKER: &str = "자살골";

/// Literal cell values meaning "played, no goals".
const ZERO_TOKENS: [&str; 2] = ["0", "0.0"];

/// A parsed scorer field.
///
/// `goals` is `None` exactly when the team did not participate. `scorers`
/// lists the individual goal credits (own goals and zero tokens removed), so
/// its length can be smaller than `goals`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoalResult {
    pub goals: Option<u32>,
    pub scorers: Vec<String>,
}

impl GoalResult {
    pub fn participated(&self) -> bool {
        self.goals.is_some()
    }
}

/// Parses scorer fields using a configurable own-goal marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorerParser {
    own_goal_marker: String,
}

impl Default for ScorerParser {
    fn default() -> Self {
        ScorerParser::new(DEFAULT_OWN_GOAL_MARKER)
    }
}

impl ScorerParser {
    pub fn new(own_goal_marker: impl Into<String>) -> Self {
        ScorerParser {
            own_goal_marker: own_goal_marker.into(),
        }
    }

    pub fn own_goal_marker(&self) -> &str {
        &self.own_goal_marker
    }

    /// Parse a raw field into participation, goal count and scorer list.
    pub fn parse(&self, raw: Option<&str>) -> GoalResult {
        GoalResult {
            goals: self.count_goals(raw),
            scorers: self.scorers(raw),
        }
    }

    /// Team goal count. Every non-empty comma-separated token is a goal,
    /// own goals included.
    pub fn count_goals(&self, raw: Option<&str>) -> Option<u32> {
        let s = raw?.trim();
        if s.is_empty() {
            return None;
        }
        if ZERO_TOKENS.contains(&s) {
            return Some(0);
        }
        Some(tokens(s).count() as u32)
    }

    /// Names credited with a goal, in sheet order and not deduplicated
    /// ("a, a" credits `a` twice).
    pub fn scorers(&self, raw: Option<&str>) -> Vec<String> {
        let Some(s) = raw.map(str::trim) else {
            return Vec::new();
        };
        if s.is_empty() || ZERO_TOKENS.contains(&s) {
            return Vec::new();
        }
        tokens(s)
            .filter(|t| !self.is_own_goal(t) && !ZERO_TOKENS.contains(t))
            .map(str::to_string)
            .collect()
    }

    pub fn is_own_goal(&self, token: &str) -> bool {
        !self.own_goal_marker.is_empty() && token.contains(self.own_goal_marker.as_str())
    }
}

fn tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|t| !t.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
