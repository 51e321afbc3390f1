use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use p2p_connect_four::config::{AppConfig, LoggingConfig};
use p2p_connect_four::context::{SessionContext, UserCommand};
use p2p_connect_four::net::{RoomCode, TcpTransport};
use p2p_connect_four::ui::App;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Play Connect Four against a friend over a direct connection.
#[derive(Parser)]
#[command(name = "p2p_connect_four", about = "Two-player Connect Four over a direct peer link")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Host to dial when joining a room
    #[arg(long)]
    peer_host: Option<String>,

    /// Room code N is served on port BASE_PORT + N
    #[arg(long)]
    base_port: Option<u16>,

    /// Create a room at startup
    #[arg(long, conflicts_with = "join")]
    host: bool,

    /// Join the room with this code at startup
    #[arg(long, value_name = "CODE")]
    join: Option<String>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(peer_host) = cli.peer_host {
        config.network.peer_host = peer_host;
    }
    if let Some(base_port) = cli.base_port {
        config.network.base_port = base_port;
    }
    config.validate().context("validating configuration")?;

    init_logging(&config.logging)?;

    let room = RoomCode::generate(&mut rand::rng());
    let transport = TcpTransport::new(config.network.clone());
    let mut app = App::new(SessionContext::new(room, transport, &config.session));
    info!(room = %room, "starting");

    let now = Instant::now();
    if cli.host {
        app.dispatch(UserCommand::CreateRoom, now);
    } else if let Some(code) = cli.join {
        app.dispatch(UserCommand::JoinRoom(code), now);
    }

    run_ui(&mut app)
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .with_context(|| format!("opening log file {}", config.file.display()))?;

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_ui(app: &mut App<TcpTransport>) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal")?;

    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res.context("running game UI")
}
