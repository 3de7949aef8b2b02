//! Equipment weight and encumbrance tracker.
//!
//! A vim-style terminal interface over the equipment ledger, the Common
//! Equipment List and the weight/slot summary.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripts:
//!
//! ```bash
//! printf 'add Rope\nweight 1 10\nstatus\n' | cargo run -p encumbrance -- --headless --no-restore
//! ```

mod app;
mod events;
mod headless;
mod ui;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use encumbrance_core::persist::describe_saves;
use encumbrance_core::{Config, FileStore, Session};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::{App, PendingIo};
use events::{handle_event, EventResult};
use ui::render::render;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "ENCUMBRANCE_LOG";

const DEFAULT_LOG_FILTER: &str = "encumbrance=info,encumbrance_core=info";

#[derive(Debug, Parser)]
#[command(name = "encumbrance")]
#[command(about = "Track equipment weight and encumbrance slots for a tabletop character")]
struct Cli {
    /// Run a line-oriented session on stdin/stdout instead of the TUI
    #[arg(long)]
    headless: bool,

    /// Directory holding storage.json and exports
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Auto-save interval in seconds (0 disables auto-save)
    #[arg(long, value_name = "N")]
    autosave_secs: Option<u64>,

    /// Log file for the TUI [default: <DIR>/encumbrance.log]
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Start with a fresh character instead of restoring the last session
    #[arg(long)]
    no_restore: bool,
}

impl Cli {
    /// Environment defaults with command line flags on top.
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(secs) = self.autosave_secs {
            config = config.with_autosave_interval(Duration::from_secs(secs));
        }
        if self.no_restore {
            config = config.with_restore_on_start(false);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config();

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config.data_dir.join("encumbrance.log"));
    init_tracing(cli.headless, &log_path)?;

    tracing::info!(data_dir = %config.data_dir.display(), "Starting encumbrance");

    let store = FileStore::open(&config.data_dir);
    let session = Session::open(config, Box::new(store));

    if cli.headless {
        return headless::run_headless(session).await.map_err(|e| e.into());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;

    // Final snapshot so nothing since the last auto-save is lost
    if !app.session.config().autosave_interval.is_zero() {
        if let Err(e) = app.session.save_session() {
            eprintln!("Failed to save session: {e}");
        }
    }

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    tracing::info!("Exiting");
    Ok(())
}

/// Install the tracing subscriber.
///
/// The TUI owns the terminal, so its logs go to a file. Headless mode logs to
/// stderr and keeps stdout for replies.
fn init_tracing(headless: bool, log_path: &Path) -> io::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if headless {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    } else {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        // Render
        terminal.draw(|f| render(f, app))?;

        // Process any pending file operation
        if let Some(pending) = app.pending_io.take() {
            match pending {
                PendingIo::Export(path) => match app.session.export(&path).await {
                    Ok(()) => app.set_status(format!("Exported to {}", path.display())),
                    Err(e) => app.set_status(format!("Export failed: {e}")),
                },
                PendingIo::Import(path) => match app.session.import(&path).await {
                    Ok(()) => {
                        app.clamp_selection();
                        app.set_status(format!("Imported {}", path.display()));
                    }
                    Err(e) => app.set_status(format!("Import failed: {e}")),
                },
                PendingIo::ListExports(dir) => match app.session.list_exports(&dir).await {
                    Ok(saves) => app.set_status(describe_saves(&dir, &saves).replace('\n', " | ")),
                    Err(e) => app.set_status(format!("Listing exports failed: {e}")),
                },
                PendingIo::PrintHtml(path) => match app.session.write_sheet_html(&path).await {
                    Ok(()) => app.set_status(format!("Sheet written to {}", path.display())),
                    Err(e) => app.set_status(format!("Print failed: {e}")),
                },
            }
            continue;
        }

        // Poll for events with timeout so auto-save keeps ticking
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            if handle_event(app, ev) == EventResult::Quit {
                return Ok(());
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}
