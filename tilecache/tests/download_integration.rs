//! Integration tests for the locator → queue → worker loop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;
use tilecache::download::{
    download_channel, write_tile_file, DownloadRequest, DownloadWorker, FetchError, TileFetcher,
};
use tilecache::locator::{LocatorSettings, ResolvedTile, TileLocator, TileOrigin};
use tilecache::log::NoOpLogger;
use tilecache::tile::{ImageExtension, TileAddress, TileSet};
use tokio_util::sync::CancellationToken;

/// Serves canned responses keyed by URL and counts calls.
#[derive(Default)]
struct FakeServer {
    responses: Mutex<HashMap<String, Result<Vec<u8>, FetchError>>>,
    calls: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    latency: Duration,
}

impl FakeServer {
    fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    fn respond(&self, url: &str, response: Result<Vec<u8>, FetchError>) {
        self.responses.lock().insert(url.to_string(), response);
    }
}

#[derive(Clone)]
struct FakeFetcher(Arc<FakeServer>);

impl TileFetcher for FakeFetcher {
    async fn fetch(&self, request: &DownloadRequest) -> Result<Vec<u8>, FetchError> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.0.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.0.peak.fetch_max(active, Ordering::SeqCst);
        if !self.0.latency.is_zero() {
            tokio::time::sleep(self.0.latency).await;
        }
        self.0.active.fetch_sub(1, Ordering::SeqCst);
        let url = request.source_url.as_deref().ok_or(FetchError::NoSource)?;
        self.0
            .responses
            .lock()
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Http { status: 404 }))
    }
}

fn earth() -> TileSet {
    TileSet::new("earth", ImageExtension::Jpg)
        .with_url_template("https://tiles.example.com/{level}/{row}/{col}.{ext}")
}

#[tokio::test]
async fn test_missing_tile_is_downloaded_into_cache() {
    let temp_dir = TempDir::new().unwrap();
    let server = Arc::new(FakeServer::default());
    server.respond("https://tiles.example.com/8/1/2.jpg", Ok(b"jpeg".to_vec()));

    let (queue, receiver) = download_channel();
    let locator = TileLocator::new(
        earth(),
        temp_dir.path(),
        LocatorSettings::default(),
        Arc::new(queue),
        Arc::new(NoOpLogger),
    );
    let address = TileAddress::new(8, 1, 2);

    let ResolvedTile::Pending { target } = locator.resolve(&address) else {
        panic!("expected a pending tile");
    };
    // Dropping the locator closes the channel so the worker drains and exits.
    drop(locator);

    let worker = DownloadWorker::new(FakeFetcher(server.clone()), Arc::new(NoOpLogger));
    let stats = worker.run(receiver, CancellationToken::new()).await;

    assert_eq!(stats.succeeded, 1);
    assert_eq!(std::fs::read(&target).unwrap(), b"jpeg");
}

#[tokio::test]
async fn test_failed_download_blocks_retries() {
    let temp_dir = TempDir::new().unwrap();
    let server = Arc::new(FakeServer::default());

    let (queue, receiver) = download_channel();
    let queue = Arc::new(queue);
    let locator = TileLocator::new(
        earth(),
        temp_dir.path(),
        LocatorSettings::default(),
        queue.clone(),
        Arc::new(NoOpLogger),
    );
    let address = TileAddress::new(8, 3, 3);
    assert!(locator.resolve(&address).is_pending());

    let worker = DownloadWorker::new(FakeFetcher(server.clone()), Arc::new(NoOpLogger));
    let token = CancellationToken::new();
    let handle = tokio::spawn(worker.run(receiver, token.clone()));

    let sentinel = locator.sentinel(&address);
    for _ in 0..200 {
        if sentinel.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(sentinel.exists());

    for _ in 0..5 {
        assert_eq!(locator.resolve(&address), ResolvedTile::Unavailable);
    }

    token.cancel();
    let stats = handle.await.unwrap();
    assert_eq!(stats.requested, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(server.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_duplicate_requests_coalesce() {
    let temp_dir = TempDir::new().unwrap();
    let server = Arc::new(FakeServer::with_latency(Duration::from_millis(100)));
    server.respond("https://tiles.example.com/2/2/2.jpg", Ok(b"jpeg".to_vec()));

    let (queue, receiver) = download_channel();
    let locator = TileLocator::new(
        earth(),
        temp_dir.path(),
        LocatorSettings::default(),
        Arc::new(queue),
        Arc::new(NoOpLogger),
    );
    let address = TileAddress::new(2, 2, 2);
    for _ in 0..3 {
        assert!(locator.resolve(&address).is_pending());
    }
    drop(locator);

    let worker = DownloadWorker::new(FakeFetcher(server.clone()), Arc::new(NoOpLogger));
    let stats = worker.run(receiver, CancellationToken::new()).await;

    assert_eq!(stats.requested, 3);
    assert_eq!(stats.coalesced, 2);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(server.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_replaces_stale_tile() {
    let temp_dir = TempDir::new().unwrap();
    let server = Arc::new(FakeServer::default());
    server.respond("https://tiles.example.com/4/4/4.jpg", Ok(b"fresh".to_vec()));

    let (queue, receiver) = download_channel();
    let locator = TileLocator::new(
        earth().with_expiration(Duration::from_secs(60)),
        temp_dir.path(),
        LocatorSettings::default(),
        Arc::new(queue),
        Arc::new(NoOpLogger),
    );
    let address = TileAddress::new(4, 4, 4);
    let path = locator.cache_path(&address);
    write_tile_file(&path, b"stale").unwrap();
    let old = filetime::FileTime::from_system_time(
        std::time::SystemTime::now() - Duration::from_secs(3600),
    );
    filetime::set_file_mtime(&path, old).unwrap();

    assert_eq!(
        locator.resolve(&address).origin(),
        Some(TileOrigin::CachedStale)
    );

    drop(locator);
    let worker = DownloadWorker::new(FakeFetcher(server), Arc::new(NoOpLogger));
    let stats = worker.run(receiver, CancellationToken::new()).await;

    assert_eq!(stats.succeeded, 1);
    assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
}

#[tokio::test]
async fn test_concurrency_limit_respected() {
    let temp_dir = TempDir::new().unwrap();
    let server = Arc::new(FakeServer::with_latency(Duration::from_millis(20)));

    let (queue, receiver) = download_channel();
    let locator = TileLocator::new(
        earth(),
        temp_dir.path(),
        LocatorSettings::default(),
        Arc::new(queue),
        Arc::new(NoOpLogger),
    );
    for col in 0..10 {
        let address = TileAddress::new(1, 0, col);
        server.respond(
            &format!("https://tiles.example.com/1/0/{}.jpg", col),
            Ok(vec![col as u8 + 1]),
        );
        assert!(locator.resolve(&address).is_pending());
    }
    drop(locator);

    let worker = DownloadWorker::new(FakeFetcher(server.clone()), Arc::new(NoOpLogger))
        .with_max_concurrent(2);
    let stats = worker.run(receiver, CancellationToken::new()).await;

    assert_eq!(stats.succeeded, 10);
    assert_eq!(server.calls.load(Ordering::SeqCst), 10);
    assert!(server.peak.load(Ordering::SeqCst) <= 2);
}
