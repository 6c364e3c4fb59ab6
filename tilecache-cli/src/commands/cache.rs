//! Cache management CLI commands.

use std::path::Path;

use clap::Subcommand;
use tilecache::cache::SweepReport;
use tilecache::config::format_size;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show disk cache size and limits
    Stats,
    /// Run one eviction sweep now
    Sweep,
    /// Clear the disk cache, removing all cached tiles
    Clear,
}

/// Run a cache subcommand.
pub fn run(config_path: Option<&Path>, action: CacheAction) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, false)?;
    runner.log_startup("cache");
    let cache = runner.open_cache()?;
    let config = cache.config();

    match action {
        CacheAction::Stats => {
            let usage = cache.usage()?;
            println!("Disk cache: {}", cache.root().display());
            println!("  Files:       {}", usage.file_count);
            println!("  Size:        {}", format_size(usage.total_bytes));
            println!("  Upper limit: {}", format_size(config.upper_limit_bytes));
            println!("  Lower limit: {}", format_size(config.lower_limit_bytes));
            if usage.total_bytes > config.upper_limit_bytes {
                println!();
                println!("Cache is over its upper limit; the next sweep will evict files.");
            }
            Ok(())
        }
        CacheAction::Sweep => {
            println!("Sweeping disk cache at: {}", cache.root().display());
            let report = cache.sweep()?;
            print_sweep_report(&report);
            Ok(())
        }
        CacheAction::Clear => {
            println!("Clearing disk cache at: {}", cache.root().display());
            let report = cache.clear();
            println!(
                "Deleted {} files, freed {}",
                report.files_deleted,
                format_size(report.bytes_freed)
            );
            Ok(())
        }
    }
}

fn print_sweep_report(report: &SweepReport) {
    if !report.evicted {
        println!(
            "Nothing to do: {} is within the upper limit",
            format_size(report.size_before)
        );
        return;
    }

    println!(
        "Evicted {} of {} files, freed {} ({} -> {}) in {:.2?}",
        report.files_deleted,
        report.files_scanned,
        format_size(report.bytes_freed),
        format_size(report.size_before),
        format_size(report.size_after),
        report.duration
    );
    if report.files_vanished > 0 {
        println!("  {} files disappeared during the sweep", report.files_vanished);
    }
    if report.delete_failures > 0 {
        println!("  {} files could not be deleted", report.delete_failures);
    }
}
