// Leaderboard widget: one player ranking at a time, cycled with h/l.
//
// Tabs across the top name every board; the table lists rank, player, team,
// the board's value and the figures behind it.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use brocelona_core::views::{self, Leaderboard, LeaderboardRow};

use crate::tui::widgets::{clamp_scroll, render_placeholder, render_scrollbar};
use crate::tui::ViewState;

const TITLE: &str = "Players";
pub const SCROLL_KEY: &str = "leaderboard";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);
    frame.render_widget(Paragraph::new(board_tabs(state.board)), parts[0]);

    let Some(dashboard) = &state.dashboard else {
        render_placeholder(frame, parts[1], TITLE, state);
        return;
    };

    let ranking = views::leaderboard(&dashboard.league, state.board, state.settings.leaderboard_size);
    let area = parts[1];

    if ranking.is_empty() {
        let paragraph = Paragraph::new(format!("  No players qualify for {}.", state.board.title()))
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(state.board.title()));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible = (area.height as usize).saturating_sub(3);
    let offset = clamp_scroll(state.scroll(SCROLL_KEY), ranking.len(), visible);

    let header = Row::new(
        ["#", "Player", "Team", state.board.value_label(), ""]
            .into_iter()
            .map(Cell::from),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = ranking
        .iter()
        .skip(offset)
        .take(visible.max(1))
        .map(|row| ranking_row(row, state))
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(20),
    ];

    let title = format!("{} (top {})", state.board.title(), state.settings.leaderboard_size);
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
    render_scrollbar(frame, area, ranking.len(), visible, offset);
}

fn ranking_row<'a>(row: &'a LeaderboardRow, state: &ViewState) -> Row<'a> {
    let team = row.team.as_deref().unwrap_or("?");
    let rank_style = if row.rank == 1 {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Row::new(vec![
        Cell::from(row.rank.to_string()).style(rank_style),
        Cell::from(row.player.as_str()),
        Cell::from(team).style(Style::default().fg(state.settings.team_color(team))),
        Cell::from(row.display.as_str()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(row.detail.as_str()).style(Style::default().fg(Color::Gray)),
    ])
}

/// Board names with the active one highlighted.
pub fn board_tabs(active: Leaderboard) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for board in Leaderboard::ALL {
        let style = if board == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", board.title()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}
