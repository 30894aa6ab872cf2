// Results widget: the match log, latest week first.
//
// Each week opens with a header row carrying the points every team gained
// that week, followed by one row per round. Rounds that did not count for
// the table are dimmed.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use brocelona_core::views::{MatchDay, RoundLine, NOT_PLAYED};

use crate::tui::widgets::{clamp_scroll, render_placeholder, render_scrollbar};
use crate::tui::ViewState;

const TITLE: &str = "Results";
pub const SCROLL_KEY: &str = "results";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(dashboard) = &state.dashboard else {
        render_placeholder(frame, area, TITLE, state);
        return;
    };
    let teams = &dashboard.league.teams;

    let header = Row::new(
        std::iter::once(Cell::from("Round")).chain(teams.iter().map(|team| {
            Cell::from(team.clone()).style(Style::default().fg(state.settings.team_color(team)))
        })),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let all_rows: Vec<Row> = dashboard.match_days.iter().flat_map(day_rows).collect();
    let total = all_rows.len();

    let visible = (area.height as usize).saturating_sub(3);
    let offset = clamp_scroll(state.scroll(SCROLL_KEY), total, visible);
    let rows: Vec<Row> = all_rows.into_iter().skip(offset).take(visible.max(1)).collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(8))
        .chain(teams.iter().map(|_| Constraint::Min(8)))
        .collect();

    let title = format!("{} ({} weeks)", TITLE, dashboard.match_days.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
    render_scrollbar(frame, area, total, visible, offset);
}

/// Week header row followed by its rounds.
fn day_rows(day: &MatchDay) -> Vec<Row<'static>> {
    let mut rows = Vec::with_capacity(day.rounds.len() + 1);
    rows.push(
        Row::new(
            std::iter::once(Cell::from(format!("Week {}", day.week)))
                .chain(day.points.iter().map(|p| Cell::from(format!("+{p} pts")))),
        )
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    );
    rows.extend(day.rounds.iter().map(round_row));
    rows
}

fn round_row(line: &RoundLine) -> Row<'static> {
    let cells = std::iter::once(Cell::from(round_label(line))).chain(
        line.cells
            .iter()
            .map(|cell| Cell::from(cell.clone()).style(Style::default().fg(cell_color(cell)))),
    );
    let style = if line.counted {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    Row::new(cells).style(style)
}

/// "R3", "R3*" for a round that did not count, "R?" without a round number.
pub fn round_label(line: &RoundLine) -> String {
    let round = line
        .round
        .map(|r| r.to_string())
        .unwrap_or_else(|| "?".to_string());
    let marker = if line.counted { "" } else { "*" };
    format!("  R{round}{marker}")
}

/// Green win, red loss, gray sit-out; everything else plain.
pub fn cell_color(cell: &str) -> Color {
    if cell == NOT_PLAYED {
        Color::DarkGray
    } else if cell.starts_with('W') {
        Color::Green
    } else if cell.starts_with('L') {
        Color::Red
    } else {
        Color::White
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::{buffer_lines, loaded_state};

    fn line(round: Option<u32>, counted: bool) -> RoundLine {
        RoundLine {
            round,
            counted,
            cells: vec![],
        }
    }

    #[test]
    fn round_label_marks_uncounted() {
        assert_eq!(round_label(&line(Some(2), true)), "  R2");
        assert_eq!(round_label(&line(Some(1), false)), "  R1*");
        assert_eq!(round_label(&line(None, false)), "  R?*");
    }

    #[test]
    fn cell_colors() {
        assert_eq!(cell_color("W (kim)"), Color::Green);
        assert_eq!(cell_color("L"), Color::Red);
        assert_eq!(cell_color("D"), Color::White);
        assert_eq!(cell_color("-"), Color::DarkGray);
        assert_eq!(cell_color("1 (kim)"), Color::White);
    }

    #[test]
    fn day_rows_include_header() {
        let state = loaded_state();
        let day = &state.dashboard.as_ref().unwrap().match_days[0];
        assert_eq!(day_rows(day).len(), day.rounds.len() + 1);
    }

    #[test]
    fn render_latest_week_first() {
        let backend = ratatui::backend::TestBackend::new(80, 12);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = loaded_state();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let lines = buffer_lines(&terminal);
        let week2 = lines.iter().position(|l| l.contains("Week 2")).unwrap();
        let week1 = lines.iter().position(|l| l.contains("Week 1")).unwrap();
        assert!(week2 < week1);
        assert!(lines.join("\n").contains("R1*"));
    }

    #[test]
    fn render_does_not_panic_empty() {
        let backend = ratatui::backend::TestBackend::new(40, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
