// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the last good league snapshot plus the
// derived view tables. The app orchestrator pushes `UiUpdate` messages over an
// mpsc channel; the TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use brocelona_core::views::{self, Leaderboard, MatchDay, PointsTable, TrendSeries};
use brocelona_core::LeagueState;
use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::protocol::{LeagueSnapshot, TabId, UiUpdate, UserCommand};
use crate::source::TableOrigin;

use layout::{build_layout, split_results, split_standings};

// ---------------------------------------------------------------------------
// DisplaySettings
// ---------------------------------------------------------------------------

/// Presentation settings taken from the config at startup.
#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub league_name: String,
    pub leaderboard_size: usize,
    /// (team keyword, color) pairs; a team takes the color of the first
    /// keyword its name contains.
    pub team_colors: Vec<(String, Color)>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            league_name: "League".to_string(),
            leaderboard_size: 10,
            team_colors: Vec::new(),
        }
    }
}

impl DisplaySettings {
    pub fn from_config(config: &Config) -> Self {
        let team_colors = config
            .league
            .teams
            .iter()
            .filter_map(|t| {
                let color = t.color.as_deref()?.parse::<Color>().ok()?;
                Some((t.keyword.clone(), color))
            })
            .collect();
        DisplaySettings {
            league_name: config.league.name.clone(),
            leaderboard_size: config.display.leaderboard_size,
            team_colors,
        }
    }

    pub fn team_color(&self, team: &str) -> Color {
        self.team_colors
            .iter()
            .find(|(keyword, _)| team.contains(keyword.as_str()))
            .map(|(_, color)| *color)
            .unwrap_or(Color::White)
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// A loaded league plus the view tables that do not depend on UI selection.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub league: LeagueState,
    pub points: PointsTable,
    pub match_days: Vec<MatchDay>,
    pub trend: Vec<TrendSeries>,
}

impl Dashboard {
    pub fn new(league: LeagueState) -> Self {
        Dashboard {
            points: views::weekly_points_table(&league),
            match_days: views::match_days(&league),
            trend: views::cumulative_points(&league),
            league,
        }
    }

    /// Team at `index`, wrapping around the team list.
    pub fn team_at(&self, index: usize) -> Option<&str> {
        let teams = &self.league.teams;
        if teams.is_empty() {
            None
        } else {
            Some(teams[index % teams.len()].as_str())
        }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Progress of the most recent load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Reloading,
    Failed(String),
}

/// TUI-local state mirroring what the orchestrator last sent.
pub struct ViewState {
    pub dashboard: Option<Dashboard>,
    pub origin: Option<TableOrigin>,
    pub loaded_at: Option<DateTime<Local>>,
    pub load_status: LoadStatus,
    pub active_tab: TabId,
    /// Leaderboard shown on the Players tab.
    pub board: Leaderboard,
    /// Team shown in the goals breakdown (index into the team list).
    pub selected_team: usize,
    /// Per-widget scroll offsets (keyed by widget name).
    pub scroll_offset: HashMap<String, usize>,
    pub confirm_quit: bool,
    pub settings: DisplaySettings,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            dashboard: None,
            origin: None,
            loaded_at: None,
            load_status: LoadStatus::Loading,
            active_tab: TabId::Standings,
            board: Leaderboard::GoldenBoot,
            selected_team: 0,
            scroll_offset: HashMap::new(),
            confirm_quit: false,
            settings: DisplaySettings::default(),
        }
    }
}

impl ViewState {
    pub fn with_settings(settings: DisplaySettings) -> Self {
        ViewState {
            settings,
            ..Default::default()
        }
    }

    /// Replace the league with a fresh snapshot.
    pub fn apply_snapshot(&mut self, snapshot: LeagueSnapshot) {
        if let Some(dashboard) = &self.dashboard {
            if dashboard.league.teams.len() != snapshot.state.teams.len() {
                self.selected_team = 0;
            }
        }
        self.dashboard = Some(Dashboard::new(snapshot.state));
        self.origin = Some(snapshot.origin);
        self.loaded_at = Some(snapshot.loaded_at);
        self.load_status = LoadStatus::Ready;
    }

    pub fn scroll(&self, key: &str) -> usize {
        self.scroll_offset.get(key).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Loaded(snapshot) => state.apply_snapshot(*snapshot),
        UiUpdate::Reloading => state.load_status = LoadStatus::Reloading,
        UiUpdate::LoadFailed(message) => state.load_status = LoadStatus::Failed(message),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);

    match state.active_tab {
        TabId::Standings => {
            let teams = state
                .dashboard
                .as_ref()
                .map(|d| d.league.teams.len())
                .unwrap_or(0);
            let (table, weekly) = split_standings(layout.main_panel, teams);
            widgets::standings::render(frame, table, state);
            widgets::weekly_points::render(frame, weekly, state);
        }
        TabId::Results => {
            let (log, goals) = split_results(layout.main_panel);
            widgets::results::render(frame, log, state);
            widgets::team_goals::render(frame, goals, state);
        }
        TabId::Players => widgets::leaderboard::render(frame, layout.main_panel, state),
        TabId::Trends => widgets::trend::render(frame, layout.main_panel, state),
    }

    render_help_bar(frame, layout.help_bar, state);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area(), state);
    }
}

/// Keyboard hints for the active tab.
pub fn help_text(tab: TabId) -> &'static str {
    match tab {
        TabId::Standings => " 1-4:Tabs | j/k:Scroll | r:Reload | q:Quit",
        TabId::Results => " 1-4:Tabs | j/k/PgUp/PgDn:Scroll | t:Next team | [/]:Scroll goals | r:Reload | q:Quit",
        TabId::Players => " 1-4:Tabs | h/l:Board | j/k:Scroll | r:Reload | q:Quit",
        TabId::Trends => " 1-4:Tabs | r:Reload | q:Quit",
    }
}

fn render_help_bar(frame: &mut Frame, area: ratatui::layout::Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        help_text(state.active_tab),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    settings: DisplaySettings,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::with_settings(settings);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Channel closed: app is shutting down
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let _ = cmd_tx.send(cmd).await;
                            if cmd == UserCommand::Quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use brocelona_core::schema::{
        AttendanceRow, AttendanceSheet, MatchRecord, MatchSheet, WeekColumn,
    };
    use brocelona_core::{compute_league_state, LeagueOptions};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    /// A two-week, three-team league shared by the widget tests.
    pub(crate) fn sample_league() -> LeagueState {
        let record = |week, round, fields: [&str; 3]| MatchRecord {
            week,
            round: Some(round),
            fields: fields
                .iter()
                .map(|f| (!f.is_empty()).then(|| f.to_string()))
                .collect(),
        };
        let matches = MatchSheet::new(
            vec!["레드".into(), "블루".into(), "옐로".into()],
            vec![
                record(1, 1, ["kim,kim", "0", ""]),
                record(1, 2, ["", "lee", "park"]),
                record(2, 1, ["kim", "", ""]),
                record(2, 2, ["0", "lee", "0"]),
            ],
        );
        let row = |team: &str, player: &str, marks: [&str; 2]| AttendanceRow {
            team: team.into(),
            player: player.into(),
            marks: marks
                .iter()
                .map(|m| (!m.is_empty()).then(|| m.to_string()))
                .collect(),
        };
        let attendance = AttendanceSheet::new(
            vec![
                WeekColumn {
                    label: "1주차".into(),
                    week: 1,
                },
                WeekColumn {
                    label: "2주차".into(),
                    week: 2,
                },
            ],
            vec![
                row("레드", "kim", ["1", ""]),
                row("블루", "lee", ["1", "1"]),
                row("옐로", "park", ["", "1"]),
            ],
        );
        compute_league_state(&matches, &attendance, &LeagueOptions::default())
    }

    pub(crate) fn loaded_state() -> ViewState {
        let mut state = ViewState::default();
        state.apply_snapshot(LeagueSnapshot {
            state: sample_league(),
            origin: TableOrigin::Local,
            loaded_at: Local::now(),
        });
        state
    }

    /// Flatten the test backend buffer into one string per row.
    pub(crate) fn buffer_lines(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.dashboard.is_none());
        assert!(state.origin.is_none());
        assert!(state.loaded_at.is_none());
        assert_eq!(state.load_status, LoadStatus::Loading);
        assert_eq!(state.active_tab, TabId::Standings);
        assert_eq!(state.board, Leaderboard::GoldenBoot);
        assert_eq!(state.selected_team, 0);
        assert!(state.scroll_offset.is_empty());
        assert!(!state.confirm_quit);
    }

    #[test]
    fn apply_loaded_builds_dashboard() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::Loaded(Box::new(LeagueSnapshot {
                state: sample_league(),
                origin: TableOrigin::Remote,
                loaded_at: Local::now(),
            })),
        );
        assert_eq!(state.load_status, LoadStatus::Ready);
        assert_eq!(state.origin, Some(TableOrigin::Remote));
        let dashboard = state.dashboard.as_ref().unwrap();
        assert_eq!(dashboard.match_days.len(), 2);
        assert_eq!(dashboard.trend.len(), 3);
        assert_eq!(dashboard.points.rows.len(), 3);
    }

    #[test]
    fn failed_reload_keeps_previous_league() {
        let mut state = loaded_state();
        apply_ui_update(&mut state, UiUpdate::Reloading);
        assert_eq!(state.load_status, LoadStatus::Reloading);
        apply_ui_update(&mut state, UiUpdate::LoadFailed("offline".into()));
        assert_eq!(state.load_status, LoadStatus::Failed("offline".into()));
        assert!(state.dashboard.is_some());
    }

    #[test]
    fn team_at_wraps() {
        let state = loaded_state();
        let dashboard = state.dashboard.as_ref().unwrap();
        assert_eq!(dashboard.team_at(0), Some("레드"));
        assert_eq!(dashboard.team_at(4), Some("블루"));
    }

    #[test]
    fn settings_team_color_by_keyword() {
        let settings = DisplaySettings {
            team_colors: vec![("레드".into(), Color::Red), ("블루".into(), Color::Blue)],
            ..Default::default()
        };
        assert_eq!(settings.team_color("레드팀"), Color::Red);
        assert_eq!(settings.team_color("블루"), Color::Blue);
        assert_eq!(settings.team_color("옐로"), Color::White);
    }

    #[test]
    fn render_frame_every_tab_loaded_and_empty() {
        for loaded in [false, true] {
            for tab in TabId::ALL {
                let backend = TestBackend::new(120, 40);
                let mut terminal = Terminal::new(backend).unwrap();
                let mut state = if loaded { loaded_state() } else { ViewState::default() };
                state.active_tab = tab;
                terminal.draw(|frame| render_frame(frame, &state)).unwrap();
            }
        }
    }

    #[test]
    fn render_frame_shows_quit_dialog() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = loaded_state();
        state.confirm_quit = true;
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
        let text = buffer_lines(&terminal).join("\n");
        assert!(text.contains("Leave the dashboard?"));
    }

    #[test]
    fn help_text_mentions_reload_everywhere() {
        for tab in TabId::ALL {
            assert!(help_text(tab).contains("r:Reload"));
        }
    }
}
