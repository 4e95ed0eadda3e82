//! CLI error type.

use std::fmt;

use avspkg::config::ConfigError;
use avspkg::logging::LoggingError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// A library operation failed.
    Library(avspkg::Error),
    /// The configuration could not be loaded.
    Config(String),
    /// Logging could not be initialized.
    Logging(LoggingError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) => write!(f, "{} error: {}", e.kind(), e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) => Some(e),
            CliError::Config(_) => None,
            CliError::Logging(e) => Some(e),
        }
    }
}

impl From<avspkg::Error> for CliError {
    fn from(e: avspkg::Error) -> Self {
        CliError::Library(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}
