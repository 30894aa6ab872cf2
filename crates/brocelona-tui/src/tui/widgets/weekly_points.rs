// Weekly points widget: points each team gained per week, season total first.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use brocelona_core::views::{PointsRow, RowKey};

use crate::tui::widgets::{clamp_scroll, render_placeholder, render_scrollbar};
use crate::tui::ViewState;

const TITLE: &str = "Weekly Points";
pub const SCROLL_KEY: &str = "weekly_points";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(dashboard) = &state.dashboard else {
        render_placeholder(frame, area, TITLE, state);
        return;
    };
    let table = &dashboard.points;

    let header = Row::new(
        std::iter::once(Cell::from("")).chain(table.teams.iter().map(|team| {
            Cell::from(team.clone()).style(Style::default().fg(state.settings.team_color(team)))
        })),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    // borders (2) + header (1)
    let visible = (area.height as usize).saturating_sub(3);
    let offset = clamp_scroll(state.scroll(SCROLL_KEY), table.rows.len(), visible);

    let rows: Vec<Row> = table
        .rows
        .iter()
        .skip(offset)
        .take(visible.max(1))
        .map(points_row)
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(9))
        .chain(table.teams.iter().map(|_| Constraint::Min(6)))
        .collect();

    let widget = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(TITLE));
    frame.render_widget(widget, area);
    render_scrollbar(frame, area, table.rows.len(), visible, offset);
}

fn points_row(row: &PointsRow) -> Row<'static> {
    let style = match row.key {
        RowKey::Total => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        RowKey::Week(_) => Style::default(),
    };
    Row::new(
        std::iter::once(Cell::from(row.key.to_string()))
            .chain(row.values.iter().map(|v| Cell::from(v.to_string()))),
    )
    .style(style)
}
