// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row): league, source, tabs          |
// +--------------------------------------------------+
// | Main Panel (tab content)                          |
// |                                                   |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// The Standings and Results tabs split the main panel further; see
// `split_standings` and `split_results`.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub main_panel: Rect,
    pub help_bar: Rect,
}

/// Build the dashboard layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(5),    // main panel
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        main_panel: vertical[1],
        help_bar: vertical[2],
    }
}

/// Standings tab: league table on top (sized to fit every team), weekly
/// points below.
pub fn split_standings(area: Rect, team_count: usize) -> (Rect, Rect) {
    // borders (2) + header (1) + one row per team
    let table_height = (team_count as u16).saturating_add(3);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(table_height), Constraint::Min(3)])
        .split(area);
    (parts[0], parts[1])
}

/// Results tab: match log (left, 62%) and per-team goals (right, 38%).
pub fn split_results(area: Rect) -> (Rect, Rect) {
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);
    (parts[0], parts[1])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
