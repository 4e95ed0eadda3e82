//! CLI subcommands.
//!
//! Each command module exposes a clap `Subcommand` enum and a `run` function
//! taking a [`CommandContext`]. Commands only reach the filesystem through the
//! context storage and only print through the context output, so they can be
//! exercised in tests with a temporary directory and a captured output.

pub mod backup;
pub mod config;
pub mod package;

use std::path::Path;

use avspkg::config::ConfigFile;
use avspkg::storage::Storage;

/// Sink for user-facing output.
pub trait Output {
    fn println(&self, line: &str);
}

/// Output printing to stdout.
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Output for ConsoleOutput {
    fn println(&self, line: &str) {
        println!("{}", line);
    }
}

/// Everything a command needs to run.
pub struct CommandContext<'a> {
    pub config: &'a ConfigFile,
    pub config_path: &'a Path,
    pub storage: &'a dyn Storage,
    pub output: &'a dyn Output,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        config: &'a ConfigFile,
        config_path: &'a Path,
        storage: &'a dyn Storage,
        output: &'a dyn Output,
    ) -> Self {
        Self {
            config,
            config_path,
            storage,
            output,
        }
    }
}
