//! Storefront - a terminal storefront manager.
//!
//! This application provides a keyboard-driven interface for signing in to a
//! remote product catalog and browsing, creating, editing and deleting its
//! products.

mod app;
mod ui;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storefront_core::auth::{Credentials, SessionState, StorageError, AUTH_FALLBACK_MESSAGE};
use storefront_core::config::Config;
use storefront_core::models::UserProfile;

use app::{App, AppState, PASSWORD_ENV, USERNAME_ENV};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Prefix of the daily rolling log file
const LOG_FILE_PREFIX: &str = "storefront.log";

const USAGE: &str = "Usage: storefront [--login | --logout | --whoami]

  (no option)  Start the terminal interface
  --login      Sign in from the command line
  --logout     Forget the saved session
  --whoami     Show the signed-in user";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a daily file so they never draw over the terminal UI. Use the
/// RUST_LOG env var to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: ignoring unreadable config: {}", e);
        Config::default()
    });

    let log_dir = config
        .cache_dir()
        .unwrap_or_else(|_| PathBuf::from("./cache"))
        .join("logs");
    let _log_guard = init_tracing(&log_dir);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--login") => return login_command(&mut config).await,
        Some("--logout") => return logout_command(&config),
        Some("--whoami") => return whoami_command(&config),
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => bail!("Unknown option: {}\n\n{}", other, USAGE),
        None => {}
    }

    info!("Storefront TUI starting");

    // Create app before touching the terminal so startup errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Storefront TUI shutting down");
    Ok(())
}

/// Sign in without the TUI, reading credentials from the environment or the
/// terminal.
async fn login_command(config: &mut Config) -> Result<()> {
    let (_, session, _) = app::open_session(config)?;

    let username = match std::env::var(USERNAME_ENV) {
        Ok(username) if !username.trim().is_empty() => username.trim().to_string(),
        _ => prompt_username(config.last_username.as_deref())?,
    };
    if username.is_empty() {
        bail!("Username is required");
    }

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        bail!("Password is required");
    }

    println!("Authenticating...");
    let saved = session
        .login(Credentials::new(username.clone(), password))
        .await;
    let user = login_outcome(saved, session.snapshot())?;

    config.last_username = Some(username);
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
    println!("Logged in as {}", user.display_name());
    Ok(())
}

/// Signed-in user after a login attempt. A rejection is reported before a
/// failure to save the session.
fn login_outcome(saved: Result<(), StorageError>, state: SessionState) -> Result<UserProfile> {
    if let Some(message) = state.error {
        bail!(message);
    }
    saved.context("Session could not be saved")?;
    state.user.ok_or_else(|| anyhow!(AUTH_FALLBACK_MESSAGE))
}

fn prompt_username(last_username: Option<&str>) -> Result<String> {
    match last_username {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match last_username {
        Some(last) if input.is_empty() => last.to_string(),
        _ => input.to_string(),
    })
}

fn logout_command(config: &Config) -> Result<()> {
    let (_, session, _) = app::open_session(config)?;
    session.logout().context("Failed to clear saved session")?;
    println!("Logged out");
    Ok(())
}

fn whoami_command(config: &Config) -> Result<()> {
    let (_, session, _) = app::open_session(config)?;
    match session.snapshot().user {
        Some(user) => {
            let username = user.username.as_deref().unwrap_or("-");
            match user.email {
                Some(ref email) => println!("{} ({}) <{}>", user.display_name(), username, email),
                None => println!("{} ({})", user.display_name(), username),
            }
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if key.kind == KeyEventKind::Press && handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Follow session changes
        app.sync_route();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
