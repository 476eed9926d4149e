//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

use crate::commands;
use crate::config::MelodyqConfig;
use crate::logging;

/// Hum a melody, get its tone intervals back
#[derive(Parser, Debug)]
#[command(name = "melodyq")]
#[command(version)]
#[command(long_about = "Terminal client for a hum-to-search melody analysis service.\n\nEach trigger asks the service to record a few seconds from its microphone,\nthen shows the detected tone intervals and any matching songs.\n\nDEFAULT COMMAND:\n    If no command is specified, 'listen' is used by default.\n\nEXAMPLES:\n    # Interactive screen, press Enter to record\n    $ melodyq\n\n    # One recording, plain output\n    $ melodyq once\n\n    # Use another server for this run\n    $ melodyq --server http://192.168.1.20:5000 once")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/melodyq/melodyq.toml\n    Logs:               ~/.local/state/melodyq/melodyq.log.*"
)]
struct Cli {
    /// Base URL of the analysis service, overriding the config file for this run
    #[arg(short, long, value_name = "URL", global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Interactive trigger screen (default)
    ///
    /// Press Enter, Space or r to record and analyse; q or Escape to quit.
    #[command(visible_alias = "l")]
    Listen,

    /// Trigger one recording and print the result
    ///
    /// Every status change goes to stdout on its own line, which makes this
    /// suitable for scripts.
    #[command(visible_alias = "o")]
    Once,

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR or $VISUAL, falling back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   melodyq completions bash > melodyq.bash
    ///   melodyq completions zsh > _melodyq
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If the configuration cannot be loaded
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that need neither logging nor config
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "melodyq", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    logging::init_logging()?;

    if cli.command == Some(Commands::Config) {
        return commands::handle_config();
    }

    let config = load_config(cli.server.as_deref())?;

    match cli.command {
        None | Some(Commands::Listen) => commands::handle_listen(&config).await?,
        Some(Commands::Once) => commands::handle_once(&config).await?,
        Some(Commands::Config) | Some(Commands::Completions { .. }) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

/// Loads the config file and applies the command-line server override.
fn load_config(server_override: Option<&str>) -> Result<MelodyqConfig, anyhow::Error> {
    let mut config = MelodyqConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        anyhow::anyhow!("Configuration error: {e}")
    })?;

    if let Some(url) = server_override {
        tracing::info!("Server overridden from command line: {url}");
        config.server.url = url.to_string();
    }

    Ok(config)
}
