//! Run command - keep the cache within its limits until interrupted.

use std::path::Path;

use tilecache::config::{format_duration, format_size};
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Start background maintenance and block until Ctrl-C.
pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, true)?;
    runner.log_startup("run");

    let cache = runner.open_cache()?;
    let config = cache.config();
    info!(
        root = %cache.root().display(),
        upper = %format_size(config.upper_limit_bytes),
        lower = %format_size(config.lower_limit_bytes),
        interval = %format_duration(config.sweep_interval),
        "Starting cache maintenance"
    );

    cache.start_maintenance()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime
        .block_on(tokio::signal::ctrl_c())
        .map_err(CliError::Runtime)?;

    info!("Interrupted, stopping cache maintenance");
    cache.stop_maintenance();

    let stats = cache.stats();
    info!(
        sweeps = stats.sweeps,
        evicting_sweeps = stats.evicting_sweeps,
        files_evicted = stats.files_evicted,
        bytes_freed = stats.bytes_freed,
        failures = stats.sweep_failures,
        "Cache maintenance stopped"
    );

    Ok(())
}
