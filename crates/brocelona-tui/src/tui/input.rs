// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (tab switching,
// scrolling, leaderboard and team selection).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{widgets, ViewState};
use crate::protocol::{TabId, UserCommand};

/// Scroll key of the per-team goals panel on the Results tab.
pub const TEAM_GOALS_SCROLL: &str = "team_goals";

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator (Reload, Quit). Returns `None` when the key press was
/// handled locally by mutating `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports both Press and Release for each keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    let scroll_key = active_widget_key(view_state);

    match key_event.code {
        KeyCode::Char(c @ '1'..='4') => {
            let index = (c as usize) - ('1' as usize);
            view_state.active_tab = TabId::ALL[index];
            None
        }

        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, scroll_key, 1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, scroll_key, 1);
            None
        }
        KeyCode::PageUp => {
            scroll_up(view_state, scroll_key, page_size());
            None
        }
        KeyCode::PageDown => {
            scroll_down(view_state, scroll_key, page_size());
            None
        }

        // Team goals panel
        KeyCode::Char('[') => {
            scroll_up(view_state, TEAM_GOALS_SCROLL, 1);
            None
        }
        KeyCode::Char(']') => {
            scroll_down(view_state, TEAM_GOALS_SCROLL, 1);
            None
        }
        KeyCode::Char('t') => {
            cycle_team(view_state);
            None
        }

        // Leaderboard selection
        KeyCode::Right | KeyCode::Char('l') => {
            if view_state.active_tab == TabId::Players {
                view_state.board = view_state.board.next();
                view_state.scroll_offset.remove(scroll_key);
            }
            None
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if view_state.active_tab == TabId::Players {
                view_state.board = view_state.board.prev();
                view_state.scroll_offset.remove(scroll_key);
            }
            None
        }

        KeyCode::Char('r') => Some(UserCommand::Reload),

        // Quit: enter confirmation mode instead of quitting immediately
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// Handle key events while in quit confirmation mode.
///
/// - `y` or `q` confirms quit (sends UserCommand::Quit)
/// - `n` or `Esc` cancels (returns to normal mode)
/// - All other keys are blocked (no-op)
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Select the next team for the goals breakdown, wrapping at the end.
fn cycle_team(view_state: &mut ViewState) {
    let team_count = view_state
        .dashboard
        .as_ref()
        .map(|d| d.league.teams.len())
        .unwrap_or(0);
    if team_count == 0 {
        return;
    }
    view_state.selected_team = (view_state.selected_team + 1) % team_count;
    view_state.scroll_offset.remove(TEAM_GOALS_SCROLL);
}

/// Scroll state key of the main widget on the active tab.
pub fn active_widget_key(view_state: &ViewState) -> &'static str {
    match view_state.active_tab {
        TabId::Standings => widgets::weekly_points::SCROLL_KEY,
        TabId::Results => widgets::results::SCROLL_KEY,
        TabId::Players => widgets::leaderboard::SCROLL_KEY,
        TabId::Trends => "trend",
    }
}

fn scroll_up(view_state: &mut ViewState, key: &str, lines: usize) {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_sub(lines);
}

fn scroll_down(view_state: &mut ViewState, key: &str, lines: usize) {
    let offset = view_state.scroll_offset.entry(key.to_string()).or_insert(0);
    *offset = offset.saturating_add(lines);
}

/// Page size for PageUp/PageDown scrolling.
fn page_size() -> usize {
    10
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
