//! Pitchside - a terminal dashboard for league standings, teams and fixtures.
//!
//! Standings and teams load once per visit. The matches screen keeps
//! refreshing in the background while a match is live or about to start,
//! and everything is served from the local cache when it can be.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pitchside_core::auth::CredentialStore;
use pitchside_core::{CacheStore, Config, FileStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name prefix, rotated daily in the cache directory
const LOG_FILE_PREFIX: &str = "pitchside.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Status,
    ClearCache,
    SetToken,
    DeleteToken,
    Help,
}

fn parse_command<I: IntoIterator<Item = String>>(args: I) -> Result<Command> {
    let mut args = args.into_iter();
    let command = match args.next().as_deref() {
        None => Command::Run,
        Some("--status") => Command::Status,
        Some("--clear-cache") => Command::ClearCache,
        Some("--set-token") => Command::SetToken,
        Some("--delete-token") => Command::DeleteToken,
        Some("-h") | Some("--help") => Command::Help,
        Some(other) => anyhow::bail!("Unknown argument '{}'. Try --help.", other),
    };
    if let Some(extra) = args.next() {
        anyhow::bail!("Unexpected argument '{}'", extra);
    }
    Ok(command)
}

/// Initialize the tracing subscriber.
///
/// The TUI logs to a file so log lines never land on the alternate screen;
/// one-shot commands log to stderr. Use RUST_LOG to control the level.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let command = parse_command(std::env::args().skip(1))?;
    let config = Config::load()?;

    match command {
        Command::Run => run(config).await,
        Command::Status => {
            init_tracing(None);
            print_status(&config)
        }
        Command::ClearCache => {
            init_tracing(None);
            let store = FileStore::new(config.cache_dir()?)?;
            store.remove_all()?;
            println!("Cleared cache in {}", store.cache_dir().display());
            Ok(())
        }
        Command::SetToken => {
            init_tracing(None);
            let token = rpassword::prompt_password("football-data.org API token: ")
                .context("Failed to read token")?;
            if token.trim().is_empty() {
                anyhow::bail!("Token is empty, nothing stored");
            }
            CredentialStore::store_token(&token)?;
            println!("Token stored in the system keychain");
            Ok(())
        }
        Command::DeleteToken => {
            init_tracing(None);
            CredentialStore::delete_token()?;
            println!("Token removed from the system keychain");
            Ok(())
        }
        Command::Help => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("pitchside {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: pitchside [--status | --clear-cache | --set-token | --delete-token | --help]");
    println!();
    println!("  (no args)      Open the dashboard");
    println!("  --status       Show the age of every cached feed");
    println!("  --clear-cache  Delete all cached feeds");
    println!("  --set-token    Store the API token for direct upstream access");
    println!("  --delete-token Remove the stored API token");
}

/// Cache age per feed. Never touches the network.
fn print_status(config: &Config) -> Result<()> {
    let store = FileStore::new(config.cache_dir()?)?;
    println!("Cache: {}", store.cache_dir().display());
    println!("Upstream: {} ({:?})", config.api_base, config.upstream);
    println!();

    let feeds: Vec<_> = config
        .dashboard_feeds()
        .into_iter()
        .chain(config.match_feeds())
        .collect();
    for (feed, age) in store.entry_ages(&feeds) {
        println!(
            "  {:<40} {}",
            feed.key(),
            age.unwrap_or_else(|| "not cached".to_string())
        );
    }
    Ok(())
}

async fn run(config: Config) -> Result<()> {
    let log_dir = config
        .cache_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());
    let _guard = init_tracing(log_dir.as_deref());
    info!("Pitchside starting");

    // Build before touching the terminal so configuration errors print plainly
    let mut app = App::from_config(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Pitchside shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll with a timeout so background refreshes show up without input
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
