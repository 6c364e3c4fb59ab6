//! Resolve command - show how a tile address resolves.

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use tilecache::download::{download_channel, DownloadKind};
use tilecache::locator::{ResolvedTile, TileLocator, TileOrigin};
use tilecache::tile::TileAddress;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `tilecache resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Tile set name, as in a [tileset.<name>] config section
    #[arg(long)]
    pub set: String,

    /// Zoom level
    #[arg(long)]
    pub level: u8,

    /// Tile row
    #[arg(long)]
    pub row: u32,

    /// Tile column
    #[arg(long)]
    pub col: u32,
}

/// Resolve one tile and print the outcome.
///
/// Downloads are not performed; a queued request is printed instead.
pub fn run(config_path: Option<&Path>, args: ResolveArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, false)?;
    runner.log_startup("resolve");
    let config = runner.config();

    let tile_set = config
        .tile_set(&args.set)
        .ok_or_else(|| CliError::UnknownTileSet {
            name: args.set.clone(),
            available: config.tile_sets.iter().map(|s| s.name.clone()).collect(),
        })?;

    let cache = runner.open_cache()?;
    let (queue, mut requests) = download_channel();
    let locator = TileLocator::for_cache(
        tile_set,
        &cache,
        config.locator_settings(),
        Arc::new(queue),
        runner.logger(),
    );

    let address = TileAddress::new(args.level, args.row, args.col);
    println!("Tile {} in set '{}'", address, args.set);

    match locator.resolve(&address) {
        ResolvedTile::Ready { path, origin } => {
            println!("  Ready:   {}", path.display());
            println!("  Source:  {}", origin_label(origin));
        }
        ResolvedTile::Pending { target } => {
            println!("  Pending: not on disk, download requested");
            println!("  Target:  {}", target.display());
        }
        ResolvedTile::Unavailable => {
            let sentinel = locator.sentinel(&address);
            match sentinel.recorded_failure() {
                Some(failed_at) => println!(
                    "  Unavailable: last download failed at {} ({})",
                    failed_at.to_rfc3339(),
                    sentinel.path().display()
                ),
                None => println!("  Unavailable: no source can provide this tile"),
            }
        }
    }

    while let Ok(request) = requests.try_recv() {
        let kind = match request.kind {
            DownloadKind::Missing => "download",
            DownloadKind::Refresh => "refresh",
        };
        match request.source_url {
            Some(url) => println!("  Queued {}: {}", kind, url),
            None => println!("  Queued {} (set has no url template)", kind),
        }
    }

    Ok(())
}

fn origin_label(origin: TileOrigin) -> &'static str {
    match origin {
        TileOrigin::Authored => "authored data",
        TileOrigin::Cached => "cache",
        TileOrigin::CachedStale => "cache (expired, refresh requested)",
        TileOrigin::Placeholder => "placeholder",
    }
}
