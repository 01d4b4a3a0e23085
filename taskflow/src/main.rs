//! `TaskFlow` terminal task board.
//!
//! Launches the TUI against a record service, or against in-process demo
//! tables when no service URL is configured. Configuration via CLI flags,
//! environment variables, or config file (`~/.config/taskflow/config.toml`).
//!
//! ```bash
//! # Offline demo mode
//! cargo run --bin taskflow
//!
//! # Against a record server
//! cargo run --bin taskflow-records &
//! cargo run --bin taskflow -- --url http://127.0.0.1:8787
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskflow::app::App;
use taskflow::config::{CliArgs, ClientConfig};
use taskflow::notify::Notifications;
use taskflow::prefs::{self, PreferenceStore};
use taskflow::records::RecordClient;
use taskflow::service::RecordService;
use taskflow::service::http::HttpService;
use taskflow::service::local::LocalService;
use taskflow::sync::{self, SyncCommand, SyncEvent};
use taskflow::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file, never stdout: the terminal belongs to the UI.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(url = ?config.service_url, "taskflow starting");

    let pref_store = config
        .preferences_path
        .clone()
        .or_else(prefs::default_path)
        .map(PreferenceStore::new);
    let dark_mode = pref_store.as_ref().map_or_else(
        || prefs::prefers_dark(std::env::var("COLORFGBG").ok().as_deref()),
        |store| {
            store.dark_mode().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable preferences");
                true
            })
        },
    );

    let notifications = Notifications::new();
    let app = App::new(notifications.clone())
        .with_max_task_title_len(config.max_task_title_len)
        .with_date_format(config.date_format.clone())
        .with_dark_mode(dark_mode);

    let http = match config.service_url.as_deref() {
        Some(url) => match HttpService::new(url, config.request_timeout) {
            Ok(service) => Some(
                service.with_credentials(config.project_id.clone(), config.public_key.clone()),
            ),
            Err(e) => {
                eprintln!("Invalid service URL: {e}");
                return Ok(());
            }
        },
        None => None,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match http {
        Some(service) => {
            let client = Arc::new(RecordClient::new(service, notifications));
            run_app(&mut terminal, app, client, &config, pref_store.as_ref()).await
        }
        None => {
            tracing::info!("no service url configured, using demo data");
            let client = Arc::new(RecordClient::new(
                LocalService::with_demo_data().await,
                notifications,
            ));
            run_app(&mut terminal, app, client, &config, pref_store.as_ref()).await
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskflow exiting");
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown so buffered
/// log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskflow.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
async fn run_app<S: RecordService + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    client: Arc<RecordClient<S>>,
    config: &ClientConfig,
    prefs: Option<&PreferenceStore>,
) -> io::Result<()> {
    let (cmd_tx, mut evt_rx) = sync::spawn_sync(client, config.channel_capacity);

    // Boards are fetched once on start; `r` reloads.
    let initial = app.load_boards();
    dispatch(&mut app, &cmd_tx, initial);

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Apply finished remote operations.
        drain_sync_events(&mut app, &cmd_tx, &mut evt_rx);

        // Step 3: Persist a theme toggle.
        if let Some(dark) = app.take_theme_change()
            && let Some(store) = prefs
            && let Err(e) = store.set_dark_mode(dark)
        {
            tracing::warn!(error = %e, "failed to save theme preference");
        }

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(command) = app.handle_key_event(key) {
                dispatch(&mut app, &cmd_tx, command);
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(SyncCommand::Shutdown);
            // Let in-flight operations finish their logging.
            tokio::task::yield_now().await;
            return Ok(());
        }
    }
}

/// Hand a command to the sync worker without blocking the UI loop.
fn dispatch(app: &mut App, tx: &mpsc::Sender<SyncCommand>, command: SyncCommand) {
    match tx.try_send(command) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(command)) => {
            tracing::warn!(?command, "sync queue full");
            app.abandon(&command);
            app.notifications().error("Busy, please try again");
        }
        Err(mpsc::error::TrySendError::Closed(command)) => {
            app.abandon(&command);
            app.notifications().error("Sync worker stopped");
        }
    }
}

/// Drain all pending `SyncEvent`s and apply them to the app.
fn drain_sync_events(
    app: &mut App,
    tx: &mpsc::Sender<SyncCommand>,
    rx: &mut mpsc::Receiver<SyncEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        if let Some(follow_up) = app.apply_event(event) {
            dispatch(app, tx, follow_up);
        }
    }
}
