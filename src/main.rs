use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use autotype::dispatcher::Dispatcher;
use autotype::emitter::{EventSink, JsonLinesSink};
use autotype::error::AppError;
use autotype::events::Event;
use autotype::registry::{catalog, CommandRegistry};
use autotype::settings::{self, AppSettings};
use autotype::state::AppState;
use autotype::{logging, paths};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "autotype",
    about = "AutoType command backend: one request in, JSON-line events out",
    version,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config directory override (holds settings.json)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Seed for every randomised provider (overrides settings)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// tracing filter, e.g. "autotype=debug" (AUTOTYPE_LOG wins over this)
    #[arg(long, global = true)]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one JSON request: {"command": ..., "arguments": {...}, "id"?: ...}
    Request { json: String },
    /// Resident mode: one JSON request per stdin line, dispatched concurrently
    Serve,
    /// Print the command catalog as JSON
    Commands,
    /// Print the effective settings; with --save, write them to settings.json
    Config {
        #[arg(long)]
        save: bool,
    },
    /// Any other word is a command name: `autotype humanize_text --text "..."`
    #[command(external_subcommand)]
    Dispatch(Vec<String>),
}

// ── State initialization ─────────────────────────────────────────

fn initialize(cli: &Cli) -> Result<Dispatcher, AppError> {
    let config_dir = cli.config_dir.clone().unwrap_or_else(paths::default_config_dir);
    let (mut loaded, load_error) = match settings::load_settings(&config_dir) {
        Ok(loaded) => (loaded, None),
        Err(e) => (AppSettings::default(), Some(e)),
    };
    if cli.seed.is_some() {
        loaded.rng_seed = cli.seed;
    }
    logging::init(cli.log.as_deref(), loaded.log_filter.as_deref());
    match load_error {
        Some(e) => settings::warn_unreadable(&config_dir, &e),
        None => tracing::debug!(config_dir = %config_dir.display(), "settings loaded"),
    }

    let state = Arc::new(AppState::new(loaded, config_dir));
    let registry = CommandRegistry::builtin()?;
    Ok(Dispatcher::new(Arc::new(registry), state))
}

fn exit_code(terminal: &Event) -> ExitCode {
    match terminal {
        Event::Result(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

fn config(state: &AppState, save: bool) -> Result<(), AppError> {
    if save {
        settings::save_settings(&state.app_config_dir, &state.settings)?;
        tracing::info!(path = %paths::settings_path(&state.app_config_dir).display(), "settings saved");
    }
    let text = serde_json::to_string_pretty(&state.settings).map_err(|e| AppError::Io {
        message: e.to_string(),
    })?;
    println!("{text}");
    Ok(())
}

async fn serve(dispatcher: Dispatcher, sink: Arc<dyn EventSink>) -> ExitCode {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let dispatcher = dispatcher.clone();
                let sink = Arc::clone(&sink);
                in_flight.spawn(async move { dispatcher.dispatch_json(&line, sink).await });
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        }
        // Reap finished dispatches so the set does not grow unbounded.
        while in_flight.try_join_next().is_some() {}
    }
    tracing::debug!(pending = in_flight.len(), "stdin closed, waiting for in-flight requests");
    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "dispatch task failed");
        }
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Commands = cli.command {
        match serde_json::to_string_pretty(&catalog::to_json_schema()) {
            Ok(text) => {
                println!("{text}");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let dispatcher = match initialize(&cli) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Commands::Config { save } = cli.command {
        return match config(dispatcher.state(), save) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let sink: Arc<dyn EventSink> = Arc::new(JsonLinesSink::stdout());

    match cli.command {
        Commands::Serve => serve(dispatcher, sink).await,
        Commands::Request { json } => exit_code(&dispatcher.dispatch_json(&json, sink).await),
        Commands::Dispatch(argv) => exit_code(&dispatcher.dispatch_argv(&argv, sink).await),
        Commands::Commands | Commands::Config { .. } => ExitCode::SUCCESS,
    }
}
