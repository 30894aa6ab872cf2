// Messages exchanged between the app orchestrator and the TUI.

use brocelona_core::LeagueState;
use chrono::{DateTime, Local};

use crate::source::TableOrigin;

/// Dashboard tabs, in key order (1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TabId {
    #[default]
    Standings,
    Results,
    Players,
    Trends,
}

impl TabId {
    pub const ALL: [TabId; 4] = [TabId::Standings, TabId::Results, TabId::Players, TabId::Trends];

    pub fn label(&self) -> &'static str {
        match self {
            TabId::Standings => "Standings",
            TabId::Results => "Results",
            TabId::Players => "Players",
            TabId::Trends => "Trends",
        }
    }
}

/// Commands sent from the TUI to the app orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// Fetch both tables again and recompute the league.
    Reload,
    Quit,
}

/// One successful load: the computed league plus where and when it came from.
#[derive(Debug, Clone)]
pub struct LeagueSnapshot {
    pub state: LeagueState,
    pub origin: TableOrigin,
    pub loaded_at: DateTime<Local>,
}

/// Updates pushed from the app orchestrator to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Loaded(Box<LeagueSnapshot>),
    Reloading,
    /// Reload failed; the previous league stays on screen.
    LoadFailed(String),
}
