// Sheet schema mapping: raw string tables -> typed match and attendance sheets.
//
// The source sheets are edited by hand, so column names drift (a team column
// may be "레드" one season and "레드팀" the next). All column discovery happens
// here, once, at ingestion. Everything downstream works on `MatchSheet` and
// `AttendanceSheet` and never looks at a header again.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{table} table is missing required column `{column}`")]
    MissingColumn { table: &'static str, column: String },

    #[error("match table has no team columns matching any of {keywords:?}")]
    NoTeamColumns { keywords: Vec<String> },
}

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

/// An untyped table exactly as a source produced it: one header row and
/// string cells. `new` trims headers and pads every row to the header width;
/// readers treat any cell past the end of a row as blank either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        RawTable { headers, rows }
    }

    /// Index of the column whose (trimmed) header equals `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Column naming conventions of the two source sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSchema {
    /// Match sheet: week number column.
    pub week_column: String,
    /// Match sheet: round number column.
    pub round_column: String,
    /// Match sheet: any column containing one of these is a team column.
    pub team_keywords: Vec<String>,
    /// Attendance sheet: team name column.
    pub team_column: String,
    /// Attendance sheet: player name column.
    pub player_column: String,
    /// Attendance sheet: any column containing this is a week column.
    pub week_marker: String,
}

impl Default for SheetSchema {
    fn default() -> Self {
        SheetSchema {
            week_column: "주차".into(),
            round_column: "라운드".into(),
            team_keywords: vec!["레드".into(), "블루".into(), "옐로".into()],
            team_column: "팀이름".into(),
            player_column: "선수이름".into(),
            week_marker: "주차".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Match sheet
// ---------------------------------------------------------------------------

/// One scheduled round. `fields` holds one raw scorer field per team, in the
/// same order as `MatchSheet::teams`; a blank cell is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub week: u32,
    pub round: Option<u32>,
    pub fields: Vec<Option<String>>,
}

impl MatchRecord {
    pub fn field(&self, team_index: usize) -> Option<&str> {
        self.fields.get(team_index).and_then(|f| f.as_deref())
    }
}

/// The match table after schema mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSheet {
    pub teams: Vec<String>,
    pub records: Vec<MatchRecord>,
}

impl MatchSheet {
    pub fn new(teams: Vec<String>, records: Vec<MatchRecord>) -> Self {
        MatchSheet { teams, records }
    }

    /// Discover team columns and convert every row with a usable week number.
    pub fn from_raw(raw: &RawTable, schema: &SheetSchema) -> Result<Self, SchemaError> {
        let week_idx = raw
            .column(&schema.week_column)
            .ok_or_else(|| SchemaError::MissingColumn {
                table: "match",
                column: schema.week_column.clone(),
            })?;
        let round_idx = raw.column(&schema.round_column);

        let team_columns: Vec<(usize, String)> = raw
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != week_idx && Some(*i) != round_idx)
            .filter(|(_, h)| schema.team_keywords.iter().any(|k| h.contains(k.as_str())))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        if team_columns.is_empty() {
            return Err(SchemaError::NoTeamColumns {
                keywords: schema.team_keywords.clone(),
            });
        }

        let mut records = Vec::with_capacity(raw.rows.len());
        for (line, row) in raw.rows.iter().enumerate() {
            let week_cell = cell(row, week_idx).trim();
            if week_cell.is_empty() {
                debug!("match row {}: blank week, dropped", line + 1);
                continue;
            }
            let Some(week) = parse_number(week_cell) else {
                warn!("match row {}: unreadable week '{}', dropped", line + 1, week_cell);
                continue;
            };
            let round = round_idx.and_then(|i| parse_number(cell(row, i)));
            let fields = team_columns
                .iter()
                .map(|(i, _)| non_blank(cell(row, *i)))
                .collect();
            records.push(MatchRecord {
                week,
                round,
                fields,
            });
        }

        Ok(MatchSheet {
            teams: team_columns.into_iter().map(|(_, h)| h).collect(),
            records,
        })
    }
}

// ---------------------------------------------------------------------------
// Attendance sheet
// ---------------------------------------------------------------------------

/// A week column of the attendance sheet and the week number it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekColumn {
    pub label: String,
    pub week: u32,
}

/// One roster line: a player, their team, and one raw mark per week column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRow {
    pub team: String,
    pub player: String,
    pub marks: Vec<Option<String>>,
}

/// The wide attendance table after schema mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSheet {
    pub weeks: Vec<WeekColumn>,
    pub rows: Vec<AttendanceRow>,
}

impl AttendanceSheet {
    pub fn new(weeks: Vec<WeekColumn>, rows: Vec<AttendanceRow>) -> Self {
        AttendanceSheet { weeks, rows }
    }

    pub fn from_raw(raw: &RawTable, schema: &SheetSchema) -> Result<Self, SchemaError> {
        let missing = |column: &str| SchemaError::MissingColumn {
            table: "attendance",
            column: column.to_string(),
        };
        let team_idx = raw
            .column(&schema.team_column)
            .ok_or_else(|| missing(&schema.team_column))?;
        let player_idx = raw
            .column(&schema.player_column)
            .ok_or_else(|| missing(&schema.player_column))?;

        let mut week_columns = Vec::new();
        for (i, header) in raw.headers.iter().enumerate() {
            if i == team_idx || i == player_idx || !header.contains(schema.week_marker.as_str()) {
                continue;
            }
            match first_digit_run(header) {
                Some(week) => week_columns.push((
                    i,
                    WeekColumn {
                        label: header.clone(),
                        week,
                    },
                )),
                None => warn!("attendance column '{}' has no week number, skipped", header),
            }
        }

        let mut rows = Vec::with_capacity(raw.rows.len());
        for row in &raw.rows {
            let player = cell(row, player_idx).trim();
            if player.is_empty() {
                continue;
            }
            rows.push(AttendanceRow {
                team: cell(row, team_idx).trim().to_string(),
                player: player.to_string(),
                marks: week_columns
                    .iter()
                    .map(|(i, _)| non_blank(cell(row, *i)))
                    .collect(),
            });
        }

        Ok(AttendanceSheet {
            weeks: week_columns.into_iter().map(|(_, w)| w).collect(),
            rows,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Cell `i` of `row`; a short row reads as blank past its end.
fn cell(row: &[String], i: usize) -> &str {
    row.get(i).map_or("", String::as_str)
}

fn non_blank(cell: &str) -> Option<String> {
    if cell.trim().is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Read a week/round cell. Spreadsheet exports turn integers into "3.0" and
/// people type "3주차", so all three spellings are accepted.
pub fn parse_number(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
            return Some(f as u32);
        }
    }
    first_digit_run(s)
}

/// The first run of ASCII digits in `s` ("12주차" -> 12).
pub fn first_digit_run(s: &str) -> Option<u32> {
    let digits: String = s
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
