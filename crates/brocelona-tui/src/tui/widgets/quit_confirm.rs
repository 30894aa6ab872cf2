// Quit confirmation overlay.
//
// Centered modal drawn over the dashboard while `ViewState::confirm_quit`
// is set. Titled with the league name; warns when a reload is still running.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::{LoadStatus, ViewState};

const MIN_WIDTH: u16 = 32;

/// Render the quit confirmation overlay centered in `area`.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = format!(" {} ", state.settings.league_name);
    let lines = dialog_lines(state);

    let widest = lines
        .iter()
        .map(|l| l.width())
        .chain(std::iter::once(Span::raw(title.as_str()).width()))
        .max()
        .unwrap_or(0);
    let width = (widest as u16).saturating_add(4).max(MIN_WIDTH);
    let height = lines.len() as u16 + 2;

    let dialog_area = centered_rect(width, height, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

/// Body of the dialog: the prompt, plus a warning while a reload is in flight.
fn dialog_lines(state: &ViewState) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::raw(" Leave the dashboard? ("),
        Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(")"),
    ])];
    if state.load_status == LoadStatus::Reloading {
        lines.push(Line::from(Span::styled(
            " A reload is still running.",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .split(area);
    let horizontal = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .split(vertical[0]);
    horizontal[0]
}
