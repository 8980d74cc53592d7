//! Research TUI Entry Point
//!
//! Usage:
//!   research-tui [OPTIONS]
//!
//! Options:
//!   --backend-url <URL>   Research backend base URL
//!   -c, --config <PATH>   Config file (default: ~/.config/research-chat/config.toml)
//!   --no-greet            Skip the welcome message

use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use research_core::{ChatConfig, ConfigOverrides, HttpResearchBackend};
use research_tui::App;

/// Terminal client for the crypto research assistant
#[derive(Parser, Debug)]
#[command(name = "research-tui", version, about)]
struct Args {
    /// Research backend base URL
    #[arg(long, env = "RESEARCH_BACKEND_URL")]
    backend_url: Option<String>,

    /// Path to config file
    #[arg(short, long, env = "RESEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Do not show the welcome message
    #[arg(long)]
    no_greet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ChatConfig::load(args.config.as_deref())?;
    let mut overrides = ConfigOverrides::new();
    if let Some(url) = args.backend_url {
        overrides = overrides.with_backend_url(url);
    }
    if args.no_greet {
        overrides = overrides.with_greet_on_start(false);
    }
    overrides.apply(&mut config)?;

    // Config decides where logs go, so it is reported only once they can be seen
    init_logging(&config)?;
    config.log_loaded();

    tracing::info!(symbols = ?config.market_symbols, "Starting research TUI");

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: research-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin or stdout is piped, or the session");
        eprintln!("has no terminal attached (e.g. SSH without -t).");
        std::process::exit(1);
    }

    let backend = Arc::new(HttpResearchBackend::from_config(&config)?);

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let size = terminal.size()?;
    let mut app = App::new(backend, &config, (size.width, size.height));
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Log to the configured file, or to stderr when none is set
///
/// Filtering follows `RUST_LOG`.
fn init_logging(config: &ChatConfig) -> anyhow::Result<()> {
    let file_layer = match &config.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer.is_none().then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(EnvFilter::from_default_env())
        .init();
    Ok(())
}
