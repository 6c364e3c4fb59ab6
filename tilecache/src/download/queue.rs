//! Download request type and queue seam.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::tile::TileAddress;

/// Why a download was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    /// The tile is not cached at all
    Missing,
    /// A cached copy exists but has expired
    Refresh,
}

/// One tile to fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Cache path the result must be written to
    pub target: PathBuf,
    /// Tile set the tile belongs to
    pub tile_set: String,
    /// Tile address within the set
    pub address: TileAddress,
    /// Source URL rendered from the set's template, if any
    pub source_url: Option<String>,
    /// Missing tile or background refresh
    pub kind: DownloadKind,
}

/// Fire-and-forget download submission.
///
/// Implementations must not block: `enqueue` is called from resolution paths
/// that run every frame. Duplicate requests for the same target are allowed
/// and should be tolerated or coalesced by the implementation.
pub trait DownloadQueue: Send + Sync {
    /// Submit a request. Returns `false` if the queue no longer accepts work.
    fn enqueue(&self, request: DownloadRequest) -> bool;
}

/// [`DownloadQueue`] backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelDownloadQueue {
    sender: mpsc::UnboundedSender<DownloadRequest>,
}

impl DownloadQueue for ChannelDownloadQueue {
    fn enqueue(&self, request: DownloadRequest) -> bool {
        self.sender.send(request).is_ok()
    }
}

/// Create a queue and the receiver a [`DownloadWorker`](super::DownloadWorker)
/// drains.
pub fn download_channel() -> (ChannelDownloadQueue, mpsc::UnboundedReceiver<DownloadRequest>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelDownloadQueue { sender }, receiver)
}
