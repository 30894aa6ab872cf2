// Team goals widget: goals for/against of the selected team, total first.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use brocelona_core::views::{self, GoalsRow, RowKey};

use crate::tui::input::TEAM_GOALS_SCROLL;
use crate::tui::widgets::standings::format_goal_difference;
use crate::tui::widgets::{clamp_scroll, render_placeholder, render_scrollbar};
use crate::tui::ViewState;

const TITLE: &str = "Team Goals";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some((dashboard, team)) = state
        .dashboard
        .as_ref()
        .and_then(|d| d.team_at(state.selected_team).map(|t| (d, t)))
    else {
        render_placeholder(frame, area, TITLE, state);
        return;
    };

    let breakdown = views::team_goals_breakdown(&dashboard.league, team);
    let visible = (area.height as usize).saturating_sub(3);
    let offset = clamp_scroll(state.scroll(TEAM_GOALS_SCROLL), breakdown.len(), visible);

    let header = Row::new(["", "GF", "GA", "GD"].into_iter().map(Cell::from))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = breakdown
        .iter()
        .skip(offset)
        .take(visible.max(1))
        .map(goals_row)
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(5),
    ];

    let title = Line::from(vec![
        Span::raw(format!("{TITLE}: ")),
        Span::styled(
            team.to_string(),
            Style::default()
                .fg(state.settings.team_color(team))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" (t: next)", Style::default().fg(Color::DarkGray)),
    ]);
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
    render_scrollbar(frame, area, breakdown.len(), visible, offset);
}

fn goals_row(row: &GoalsRow) -> Row<'static> {
    let style = match row.key {
        RowKey::Total => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        RowKey::Week(_) => Style::default(),
    };
    Row::new(vec![
        Cell::from(row.key.to_string()),
        Cell::from(row.goals_for.to_string()),
        Cell::from(row.goals_against.to_string()),
        Cell::from(format_goal_difference(row.goal_difference)),
    ])
    .style(style)
}
