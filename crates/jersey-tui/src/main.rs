// Jersey picker entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config (defaults copied on first run, endpoint override applied)
// 3. Build the catalog and load persisted votes
// 4. Build the submission client
// 5. Create mpsc channels and spawn the app loop
// 6. Run the TUI until the user quits
// 7. Wait for the app loop to finish

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use jersey_app::app::{self, AppState};
use jersey_app::submit::SubmissionClient;
use jersey_core::catalog::Catalog;
use jersey_core::config;
use jersey_core::votes::{SqliteStore, VoteStore};
use jersey_tui::tui::{self, ViewState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Jersey picker starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: autoplay every {} ms, {} units per column",
        config.carousel.autoplay_interval_ms, config.carousel.units_per_cell
    );

    // 3. Catalog and votes
    let catalog = Catalog::reference().context("invalid jersey catalog")?;
    let db_path = config.storage.database_path();
    let db = SqliteStore::open(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path.display());
    let votes = VoteStore::load(Box::new(db), config.storage.votes_key.clone());
    info!("Loaded {} stored vote(s)", votes.votes().len());

    // 4. Submission client
    let client = SubmissionClient::from_config(&config.submission)
        .context("failed to build the HTTP client")?;
    match &client {
        SubmissionClient::Active(form) => info!("Submissions go to {}", form.endpoint()),
        SubmissionClient::Disabled => {
            warn!("No form endpoint configured; submissions are disabled")
        }
    }

    // 5. Channels and the app loop
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(64);
    let (submission_tx, submission_rx) = mpsc::channel(4);

    let app_state = AppState::new(votes, Arc::new(client), submission_tx);
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, submission_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Run the TUI (blocks until the user quits)
    let view_state = ViewState::new(
        catalog,
        config.carousel.options(),
        config.carousel.units_per_cell,
        Instant::now(),
    );
    let tui_result = tui::run(ui_rx, cmd_tx, view_state).await;
    if let Err(e) = &tui_result {
        error!("TUI error: {}", e);
    }

    // 7. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Jersey picker shut down");
    tui_result
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("jersey-picker.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("jersey_picker=info,jersey_tui=info,jersey_app=info,jersey_core=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
