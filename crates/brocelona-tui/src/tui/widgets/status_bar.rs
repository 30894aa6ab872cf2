// Status bar widget: league name, load status, data origin, tab indicator.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::TabId;
use crate::tui::{LoadStatus, ViewState};

/// Render the status bar into the given area.
///
/// Layout: [status dot] [league name] | [origin @ time] | [tab bar] [failure]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    let (dot, dot_color) = status_indicator(&state.load_status);
    spans.push(Span::styled(format!(" {dot} "), Style::default().fg(dot_color)));

    spans.push(Span::styled(
        state.settings.league_name.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));

    spans.push(Span::styled(origin_text(state), Style::default().fg(Color::White)));
    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));

    spans.extend(tab_spans(state.active_tab));

    if let LoadStatus::Failed(message) = &state.load_status {
        spans.push(Span::styled(
            format!("reload failed: {message}"),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Return the status dot character and its color.
pub fn status_indicator(status: &LoadStatus) -> (&'static str, Color) {
    match status {
        LoadStatus::Ready => ("●", Color::Green),
        LoadStatus::Loading | LoadStatus::Reloading => ("●", Color::Yellow),
        LoadStatus::Failed(_) => ("●", Color::Red),
    }
}

/// "local files @ 14:05" or "loading..." before the first snapshot.
pub fn origin_text(state: &ViewState) -> String {
    if state.load_status == LoadStatus::Reloading {
        return "reloading...".to_string();
    }
    match (state.origin, state.loaded_at) {
        (Some(origin), Some(at)) => format!("{origin} @ {}", at.format("%H:%M:%S")),
        _ => "loading...".to_string(),
    }
}

/// Build tab indicator spans with the active tab highlighted.
/// E.g. "[1:Standings] [2:Results] [3:Players] [4:Trends]"
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, tab_id) in TabId::ALL.into_iter().enumerate() {
        let style = if tab_id == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", i + 1, tab_id.label()), style));
        spans.push(Span::raw(" "));
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
