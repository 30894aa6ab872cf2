// Standings widget: the league table.
//
// One row per team in rank order: P W D L GF GA GD Pts, team names in their
// configured colors.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use brocelona_core::standings::TeamStanding;

use crate::tui::widgets::render_placeholder;
use crate::tui::ViewState;

const TITLE: &str = "Standings";

/// Render the league table into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(dashboard) = &state.dashboard else {
        render_placeholder(frame, area, TITLE, state);
        return;
    };

    let header = Row::new(
        ["#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"]
            .into_iter()
            .map(Cell::from),
    )
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = dashboard
        .league
        .standings
        .iter()
        .map(|s| {
            let color = state.settings.team_color(&s.team);
            Row::new(vec![
                Cell::from(s.rank.to_string()),
                Cell::from(s.team.clone()).style(Style::default().fg(color)),
                Cell::from(s.played.to_string()),
                Cell::from(s.wins.to_string()),
                Cell::from(s.draws.to_string()),
                Cell::from(s.losses.to_string()),
                Cell::from(s.goals_for.to_string()),
                Cell::from(s.goals_against.to_string()),
                Cell::from(format_goal_difference(s.goal_difference)),
                Cell::from(s.points.to_string())
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(12),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
    ];

    let rounds = dashboard.league.counted_rounds();
    let title = match leader_margin(&dashboard.league.standings) {
        Some(margin) => format!("{TITLE} ({rounds} rounds, lead by {margin})"),
        None => format!("{TITLE} ({rounds} rounds)"),
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

/// Goal difference with an explicit sign: "+3", "0", "-2".
pub fn format_goal_difference(gd: i64) -> String {
    if gd > 0 {
        format!("+{gd}")
    } else {
        gd.to_string()
    }
}

/// The leader's points margin over the runner-up, if there are two teams.
pub fn leader_margin(standings: &[TeamStanding]) -> Option<u32> {
    match standings {
        [first, second, ..] => Some(first.points.saturating_sub(second.points)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
