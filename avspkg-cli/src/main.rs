//! avspkg CLI - Command-line interface
//!
//! Validates staged AVS node packages and manages instance backups using the
//! avspkg library.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use tracing::debug;

use avspkg::config::{config_file_path, ConfigFile};
use avspkg::logging::init_logging;
use avspkg::storage::OsStorage;

use commands::backup::BackupCommands;
use commands::config::ConfigCommands;
use commands::package::PackageCommands;
use commands::{CommandContext, ConsoleOutput};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "avspkg", version, about = "Validate AVS node packages and manage instance backups")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate packages and manage checksum registries
    #[command(subcommand)]
    Package(PackageCommands),

    /// Create and inspect instance backups
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show or initialize configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Map `-v` occurrences to a filter level, if any were given.
fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let (config_path, config) = match cli.config {
        Some(path) => {
            let config = ConfigFile::load_from(&path)?;
            (path, config)
        }
        None => (config_file_path()?, ConfigFile::load()?),
    };

    let mut logging = config.logging.clone();
    if let Some(level) = verbosity_level(cli.verbose) {
        logging.level = level.to_string();
    }
    let _guard = init_logging(&logging)?;
    debug!(config = %config_path.display(), "Configuration loaded");

    let storage = OsStorage::new();
    let output = ConsoleOutput::new();
    let ctx = CommandContext::new(&config, &config_path, &storage, &output);

    match cli.command {
        Commands::Package(command) => commands::package::run(command, &ctx),
        Commands::Backup(command) => commands::backup::run(command, &ctx),
        Commands::Config(command) => commands::config::run(command, &ctx),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
