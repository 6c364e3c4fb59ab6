//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! - [`cache`] - Cache management (stats, sweep, clear)
//! - [`config`] - Configuration management (path, show, init)
//! - [`resolve`] - Tile lookup
//! - [`run`] - Background cache maintenance until interrupted

pub mod cache;
pub mod config;
pub mod resolve;
pub mod run;
