// Attendance normalization: wide roster sheet -> long (player, week) records.

use serde::Serialize;

use crate::schema::AttendanceSheet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub player: String,
    pub team: String,
    pub week: u32,
    pub attended: bool,
}

/// A roster line: who plays for which team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub player: String,
    pub team: String,
}

/// Roster lines in sheet order (duplicates kept; consumers decide).
pub fn roster(sheet: &AttendanceSheet) -> Vec<RosterEntry> {
    sheet
        .rows
        .iter()
        .map(|r| RosterEntry {
            player: r.player.clone(),
            team: r.team.clone(),
        })
        .collect()
}

/// Whether an attendance cell marks the player as present.
///
/// Sheets use either numeric flags ("1", "0") or free-text marks ("O", "v").
/// A number counts when it is greater than zero; anything that is not a
/// number counts when it is non-blank.
pub fn is_attended(raw: Option<&str>) -> bool {
    let Some(s) = raw.map(str::trim) else {
        return false;
    };
    match s.parse::<f64>() {
        Ok(v) => v > 0.0,
        Err(_) => !s.is_empty(),
    }
}

/// Reshape the wide sheet into one record per (roster row, week column),
/// week column by week column.
pub fn normalize(sheet: &AttendanceSheet) -> Vec<AttendanceRecord> {
    let mut records = Vec::with_capacity(sheet.weeks.len() * sheet.rows.len());
    for (col, week) in sheet.weeks.iter().enumerate() {
        for row in &sheet.rows {
            let mark = row.marks.get(col).and_then(|m| m.as_deref());
            records.push(AttendanceRecord {
                player: row.player.clone(),
                team: row.team.clone(),
                week: week.week,
                attended: is_attended(mark),
            });
        }
    }
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
