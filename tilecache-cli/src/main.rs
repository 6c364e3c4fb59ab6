//! tilecache CLI - inspect and maintain a tile cache from the command line.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::resolve::ResolveArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "tilecache")]
#[command(version = tilecache::VERSION)]
#[command(about = "Size-bounded tile cache maintenance and tile lookup", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.tilecache/config.ini
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Disk cache management
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show where a tile would be loaded from
    Resolve(ResolveArgs),

    /// Configuration file management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Keep the cache within its limits until interrupted (Ctrl-C)
    Run,
}

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result: Result<(), CliError> = match cli.command {
        Commands::Cache { action } => commands::cache::run(config_path, action),
        Commands::Resolve(args) => commands::resolve::run(config_path, args),
        Commands::Config { command } => commands::config::run(config_path, command),
        Commands::Run => commands::run::run(config_path),
    };

    if let Err(e) = result {
        e.exit();
    }
}
