//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show` and `config init`.

use std::path::Path;

use clap::Subcommand;
use tilecache::config::{format_duration, format_size, ConfigFile};

use crate::error::CliError;
use crate::runner::config_path;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration (file values over defaults)
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(config_override: Option<&Path>, command: ConfigCommands) -> Result<(), CliError> {
    let path = config_path(config_override);

    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            if !path.exists() {
                println!("; {} does not exist, showing defaults", path.display());
            }
            let config = ConfigFile::load_from(&path)?;
            print_config(&config);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists(path));
            }
            ConfigFile::default().save_to(&path)?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}

fn print_config(config: &ConfigFile) {
    let cache = &config.cache;
    println!("[cache]");
    println!("directory = {}", cache.directory.display());
    println!("upper_limit = {}", format_size(cache.upper_limit));
    println!("lower_limit = {}", format_size(cache.lower_limit));
    println!("sweep_interval = {}", format_duration(cache.sweep_interval));
    println!("sweep_reference = {}", cache.sweep_reference);

    let tiles = &config.tiles;
    println!();
    println!("[tiles]");
    println!("authored_directory = {}", display_optional(tiles.authored_directory.as_deref()));
    println!("placeholder = {}", display_optional(tiles.placeholder.as_deref()));
    println!("retry_backoff = {}", format_duration(tiles.retry_backoff));

    println!();
    println!("[download]");
    println!("max_concurrent = {}", config.download.max_concurrent);

    println!();
    println!("[logging]");
    println!("file = {}", config.logging.file.display());

    for set in &config.tile_sets {
        println!();
        println!("[tileset.{}]", set.name);
        println!("extension = {}", set.extension);
        println!(
            "directory = {}",
            set.directory
                .as_deref()
                .unwrap_or_else(|| Path::new(&set.name))
                .display()
        );
        match set.expiration {
            Some(expiration) => println!("expiration = {}", format_duration(expiration)),
            None => println!("expiration = (never)"),
        }
        println!("downloadable = {}", set.downloadable);
        println!("url = {}", set.url.as_deref().unwrap_or("(not set)"));
    }
}

fn display_optional(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
