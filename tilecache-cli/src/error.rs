//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use tilecache::cache::CacheError;
use tilecache::config::ConfigFileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read or holds invalid values
    Config(ConfigFileError),
    /// Cache could not be opened or operated on
    Cache(CacheError),
    /// `resolve` named a tile set that is not configured
    UnknownTileSet { name: String, available: Vec<String> },
    /// Config file already exists and would be overwritten
    ConfigExists(PathBuf),
    /// Async runtime or signal handling failed
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::UnknownTileSet { available, .. } => {
                eprintln!();
                if available.is_empty() {
                    eprintln!("No tile sets are configured. Add a section such as:");
                    eprintln!("  [tileset.earth]");
                    eprintln!("  extension = jpg");
                } else {
                    eprintln!("Configured tile sets: {}", available.join(", "));
                }
            }
            CliError::Cache(CacheError::Unwritable { path, .. }) => {
                eprintln!();
                eprintln!("Check that {} is writable by this user,", path.display());
                eprintln!("or point [cache] directory somewhere else in the config file.");
            }
            CliError::Cache(CacheError::InvalidConfig(_)) | CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'tilecache config show' to see the effective settings.");
            }
            CliError::ConfigExists(_) => {
                eprintln!();
                eprintln!("Use --force to overwrite it with defaults.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Cache(e) => write!(f, "{}", e),
            CliError::UnknownTileSet { name, .. } => write!(f, "Unknown tile set '{}'", name),
            CliError::ConfigExists(path) => {
                write!(f, "Config file already exists: {}", path.display())
            }
            CliError::Runtime(e) => write!(f, "Runtime error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Cache(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}
