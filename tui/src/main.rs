//! docchat TUI Entry Point
//!
//! Launches the terminal UI for docchat.
//!
//! Usage:
//!   docchat [OPTIONS]
//!
//! Options:
//!   --backend-url <URL>   Chat backend base URL
//!   --config <PATH>       Config file (default: ~/.config/docchat/client.toml)
//!   --locale <th|en>      Display language
//!   --mode <MODE>         Initial mode (general or document)

use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docchat_core::{default_config_path, load_config_from_path, ConfigOverrides, Locale, Mode};
use docchat_tui::App;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(author, version, about = "docchat - chat with your documents from the terminal", long_about = None)]
struct Cli {
    /// Chat backend base URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Display language (th, en)
    #[arg(long)]
    locale: Option<Locale>,

    /// Initial mode (general, document)
    #[arg(long)]
    mode: Option<Mode>,

    /// Seconds between document status checks
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log to a file; the terminal belongs to the UI
    let log_path = init_logging(cli.verbose);

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: docchat requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - Running in a non-interactive environment (CI, container)");
        eprintln!("  - SSH without -t flag");
        eprintln!("  - Piped stdin/stdout");
        std::process::exit(1);
    }

    let mut config = load_config_from_path(cli.config.clone().or_else(default_config_path))?;
    overrides(&cli).apply(&mut config);
    config.validate()?;
    tracing::info!(
        backend = %config.backend.base_url,
        source = %config.source(),
        "Configuration loaded"
    );

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if result.is_err() {
        if let Some(path) = log_path {
            eprintln!("See {} for details", path.display());
        }
    }

    // Propagate any errors
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &docchat_core::ClientConfig,
) -> anyhow::Result<()> {
    let mut app = App::new(config)?;
    app.run(terminal).await
}

fn overrides(cli: &Cli) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::new();
    if let Some(url) = &cli.backend_url {
        overrides = overrides.with_backend_url(url.clone());
    }
    if let Some(locale) = cli.locale {
        overrides = overrides.with_locale(locale);
    }
    if let Some(mode) = cli.mode {
        overrides = overrides.with_mode(mode);
    }
    if let Some(secs) = cli.poll_interval {
        overrides = overrides.with_poll_interval_secs(secs);
    }
    overrides
}

/// Install a file subscriber under the cache directory
///
/// Returns the log path, or None if logging could not be set up.
fn init_logging(verbose: bool) -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("docchat");
    std::fs::create_dir_all(&dir).ok()?;
    let path = dir.join("docchat.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let default_filter = if verbose {
        "docchat_core=debug,docchat_tui=debug"
    } else {
        "docchat_core=info,docchat_tui=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();

    Some(path)
}
