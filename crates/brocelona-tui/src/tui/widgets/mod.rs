// TUI widget modules for each dashboard panel.

pub mod leaderboard;
pub mod quit_confirm;
pub mod results;
pub mod standings;
pub mod status_bar;
pub mod team_goals;
pub mod trend;
pub mod weekly_points;

use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::tui::{LoadStatus, ViewState};

/// Message shown in place of a panel while no league is loaded.
pub fn empty_message(state: &ViewState) -> String {
    match &state.load_status {
        LoadStatus::Failed(message) => format!("  Could not load league: {message}"),
        _ => "  Loading league...".to_string(),
    }
}

/// Render a titled panel holding only the empty-state message.
pub fn render_placeholder(frame: &mut Frame, area: Rect, title: &str, state: &ViewState) {
    let paragraph = Paragraph::new(empty_message(state))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(paragraph, area);
}

/// Clamp a stored scroll offset so the last page stays full.
pub fn clamp_scroll(offset: usize, total: usize, visible: usize) -> usize {
    offset.min(total.saturating_sub(visible))
}

/// Vertical scrollbar inside a bordered panel, drawn only on overflow.
pub fn render_scrollbar(frame: &mut Frame, area: Rect, total: usize, visible: usize, offset: usize) {
    if total <= visible {
        return;
    }
    let mut scrollbar_state = ScrollbarState::new(total.saturating_sub(visible)).position(offset);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_scroll_keeps_last_page_full() {
        assert_eq!(clamp_scroll(0, 30, 10), 0);
        assert_eq!(clamp_scroll(15, 30, 10), 15);
        assert_eq!(clamp_scroll(25, 30, 10), 20);
        assert_eq!(clamp_scroll(5, 4, 10), 0);
    }

    #[test]
    fn empty_message_reports_failure() {
        let mut state = ViewState::default();
        assert!(empty_message(&state).contains("Loading"));
        state.load_status = LoadStatus::Failed("no such file".into());
        assert!(empty_message(&state).contains("no such file"));
    }
}
