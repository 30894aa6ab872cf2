// League dashboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Choose table sources (spreadsheet or local files)
// 4. Load the league once; a failure here is fatal
// 5. Create mpsc channels and hand the first snapshot to the TUI
// 6. Spawn app logic task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use brocelona_tui::app;
use brocelona_tui::config;
use brocelona_tui::protocol::UiUpdate;
use brocelona_tui::source::SourceSet;
use brocelona_tui::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("League dashboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, goal credit {:?}",
        config.league.name,
        config.league.teams.len(),
        config.scoring.goal_credit
    );

    // 3. Table sources
    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let env_flag = std::env::var(config::REMOTE_ENV_VAR).ok();
    let sources = SourceSet::from_config(&config, &cwd, env_flag.as_deref());

    // 4. Initial load
    let mut app_state = app::AppState::from_config(&config, sources);
    let snapshot = app_state
        .load()
        .await
        .context("failed to load the league at startup")?;

    // 5. Channels; the first snapshot is queued before the TUI starts.
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(16);
    ui_tx
        .send(UiUpdate::Loaded(Box::new(snapshot)))
        .await
        .context("failed to queue the initial league")?;

    // 6. App logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. TUI (blocks until the user quits)
    info!("Application ready");
    let settings = tui::DisplaySettings::from_config(&config);
    if let Err(e) = tui::run(ui_rx, cmd_tx, settings).await {
        error!("TUI error: {:#}", e);
    }

    // 8. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("League dashboard shut down cleanly");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("brocelona.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("brocelona_tui=info,brocelona_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
