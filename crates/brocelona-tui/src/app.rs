// Application orchestrator.
//
// Owns the table sources and league settings. Every load fetches both tables
// and recomputes the whole league from scratch; nothing is cached between
// loads except the last good snapshot, which the TUI keeps on screen when a
// reload fails.

use anyhow::Context;
use brocelona_core::schema::SheetSchema;
use brocelona_core::{LeagueOptions, LeagueState};
use chrono::Local;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::protocol::{LeagueSnapshot, UiUpdate, UserCommand};
use crate::source::SourceSet;

/// Central application state owned by the orchestrator task.
pub struct AppState {
    pub schema: SheetSchema,
    pub options: LeagueOptions,
    pub sources: SourceSet,
    /// Successful loads so far, the startup load included.
    pub loads: u64,
}

impl AppState {
    pub fn new(schema: SheetSchema, options: LeagueOptions, sources: SourceSet) -> Self {
        AppState {
            schema,
            options,
            sources,
            loads: 0,
        }
    }

    pub fn from_config(config: &Config, sources: SourceSet) -> Self {
        AppState::new(config.sheet_schema(), config.league_options(), sources)
    }

    /// Fetch both tables and compute a fresh league.
    pub async fn load(&mut self) -> anyhow::Result<LeagueSnapshot> {
        let tables = self
            .sources
            .load()
            .await
            .context("failed to load league tables")?;
        let state = LeagueState::from_raw(
            &tables.matches,
            &tables.attendance,
            &self.schema,
            &self.options,
        )
        .with_context(|| format!("league tables from {} do not match the schema", tables.origin))?;

        self.loads += 1;
        info!(
            "League loaded from {} ({} teams, {} rounds, {} players)",
            tables.origin,
            state.teams.len(),
            state.results.len(),
            state.players.len()
        );
        Ok(LeagueSnapshot {
            state,
            origin: tables.origin,
            loaded_at: Local::now(),
        })
    }

    /// Handle one command. Returns `false` when the loop should stop.
    pub async fn handle_command(
        &mut self,
        cmd: UserCommand,
        ui_tx: &mpsc::Sender<UiUpdate>,
    ) -> bool {
        match cmd {
            UserCommand::Reload => {
                info!("Reload requested");
                let _ = ui_tx.send(UiUpdate::Reloading).await;
                let update = match self.load().await {
                    Ok(snapshot) => UiUpdate::Loaded(Box::new(snapshot)),
                    Err(e) => {
                        warn!("Reload failed: {:#}", e);
                        UiUpdate::LoadFailed(format!("{e:#}"))
                    }
                };
                let _ = ui_tx.send(update).await;
                true
            }
            UserCommand::Quit => {
                info!("Quit requested");
                false
            }
        }
    }
}

/// Run the orchestrator until the TUI quits or drops its command sender.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    while let Some(cmd) = cmd_rx.recv().await {
        if !state.handle_command(cmd, &ui_tx).await {
            break;
        }
    }

    info!("Application event loop finished after {} loads", state.loads);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
