//! # cfsd panel entry point
//!
//! Full-screen control panel for one jailed user: list the files in the jail,
//! open one in the viewer, or drop into a shell inside the jail.
//!
//! ## Usage
//!
//! ```bash
//! # Stock jail layout, ten minute session
//! cfsd-panel
//!
//! # Custom config and a log file to watch from another terminal
//! cfsd-panel --config ./panel.json --log-file /tmp/panel.log
//!
//! # Shorter countdown
//! cfsd-panel --session-minutes 3
//! ```
//!
//! ## Key Bindings
//!
//! ### Global
//! - `q` / `Ctrl+c` - Quit
//! - `Tab` - Switch between selector and viewer
//!
//! ### Selector
//! - `j` / `Down`, `k` / `Up` - Move
//! - `Enter` - Choose
//! - `Esc` - Back to the action menu
//!
//! ### Viewer
//! - `j` / `k` - Scroll by line
//! - `PageDown` / `PageUp` - Scroll by page
//! - `g` / `G` - Jump to top / bottom

use cfsd_panel::config::Config;
use cfsd_panel::ui::{CrosstermControl, CrosstermEventReader, Runtime};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// cfsd panel - browse and open files inside your jail
#[derive(Parser, Debug)]
#[command(name = "cfsd-panel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal control panel for a chroot jail", long_about = None)]
struct Args {
    /// Path to a JSON config file (defaults to the platform config dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file; logging is discarded otherwise
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Override the session countdown length
    #[arg(long, value_name = "MINUTES")]
    session_minutes: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);

        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    // Restore panic hook
    let _ = panic::take_hook();

    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "panel exited with an error");
    }
    result
}

/// The TUI owns stdout, so logs go to a file or nowhere.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(minutes) = args.session_minutes {
        config.session_minutes = minutes;
    }
    Ok(config)
}

async fn run_application(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    tracing::info!(
        jail = %config.jail.root(),
        session_minutes = config.session_minutes,
        "starting panel"
    );

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode for terminal")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut runtime = Runtime::new(&config);
    let run_result = runtime
        .run(&mut terminal, &mut CrosstermEventReader, &mut CrosstermControl)
        .await;

    // Restore terminal (always runs, even if the loop failed)
    let cleanup_result = cleanup_terminal(&mut terminal);

    run_result?;
    cleanup_result?;

    Ok(())
}

/// Clean up terminal state
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}
