//! IR-Learn application entry point.
//!
//! Wires together the capture source, the event mailbox, the workflow state
//! machine, the profile store, and the console UI, then drives the session
//! to completion on the Tokio runtime.
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML config, defaults on first run
//!  └─ learn
//!       ├─ SimulatedReceiver -- capture callback → event mailbox
//!       ├─ stdin pump        -- console lines → intents → event mailbox
//!       └─ LearnStateMachine -- single consumer, runs to an outcome
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use irlearn_app::application::events::event_channel;
use irlearn_app::application::learn::{wire_capture, LearnOutcome, LearnStateMachine};
use irlearn_app::infrastructure::signal_source::simulated::SimulatedReceiver;
use irlearn_app::infrastructure::signal_source::SignalSource;
use irlearn_app::infrastructure::storage::config::{load_config, AppConfig};
use irlearn_app::infrastructure::storage::profiles::{ProfileStore, TomlProfileStore};
use irlearn_app::infrastructure::ui_bridge::{parse_command, ConsoleView};
use irlearn_core::ButtonSequence;

#[derive(Parser)]
#[command(name = "irlearn", about = "Learn an infrared remote and save it as a profile")]
struct Cli {
    /// Directory to store profiles in (defaults to the platform data dir).
    #[arg(long, env = "IRLEARN_PROFILES_DIR")]
    profiles_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the learning workflow (the default).
    Learn,
    /// Print a stored profile.
    Show { path: PathBuf },
    /// List stored profiles.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config().context("failed to load configuration")?;

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.app.log_level.clone())),
        )
        .init();

    let profiles_dir = match cli
        .profiles_dir
        .or_else(|| config.storage.profiles_dir.clone())
    {
        Some(dir) => dir,
        None => TomlProfileStore::default_dir().context("no profile directory available")?,
    };
    debug!(dir = %profiles_dir.display(), "using profile directory");
    let store = Arc::new(TomlProfileStore::new(profiles_dir));

    match cli.command.unwrap_or(Command::Learn) {
        Command::Learn => learn(&config, store).await,
        Command::Show { path } => show(store, &path).await,
        Command::List => list(store).await,
    }
}

/// Runs one learning session on the console.
async fn learn(config: &AppConfig, store: Arc<TomlProfileStore>) -> anyhow::Result<()> {
    let buttons = if config.buttons.names.is_empty() {
        ButtonSequence::standard()
    } else {
        ButtonSequence::new(config.buttons.names.clone())
            .context("invalid button catalogue in config")?
    };

    if !config.capture.simulate {
        // No hardware backend ships yet; the demodulator is an external
        // collaborator reachable only through the SignalSource trait.
        bail!("no hardware capture backend available; set capture.simulate = true");
    }
    let source: Arc<dyn SignalSource> = Arc::new(SimulatedReceiver::new(Duration::from_millis(
        config.capture.simulate_period_ms,
    )));

    let (events, mailbox) = event_channel();
    wire_capture(source.as_ref(), events.clone());

    // Console pump: a dedicated thread, because stdin reads are blocking.
    // It only translates lines into intents; the machine does the rest.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if let Some(event) = parse_command(&line) {
                        events.send(event);
                    } else if !line.trim().is_empty() {
                        println!("unknown command: {}", line.trim());
                    }
                }
            }
        }
    });

    let mut machine = LearnStateMachine::new(buttons, mailbox, source, store);
    machine.set_observer(Box::new(ConsoleView));

    match machine.run().await? {
        LearnOutcome::Completed => info!("session completed"),
        LearnOutcome::Aborted => info!("session aborted"),
    }
    Ok(())
}

/// Prints one stored profile.
async fn show(store: Arc<TomlProfileStore>, path: &PathBuf) -> anyhow::Result<()> {
    let profile = store
        .load(path)
        .await
        .with_context(|| format!("failed to load {}", path.display()))?;

    println!("{} ({} buttons)", profile.name, profile.buttons.len());
    for button in &profile.buttons {
        println!("  [{}] {}", button.slot, button.button);
        for line in button.signal.to_string().lines() {
            println!("      {line}");
        }
    }
    Ok(())
}

/// Lists the stored profiles.
async fn list(store: Arc<TomlProfileStore>) -> anyhow::Result<()> {
    let paths = store.list().await.context("failed to list profiles")?;
    if paths.is_empty() {
        println!("no profiles stored yet");
        return Ok(());
    }
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}
