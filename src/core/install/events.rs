// ─── Pipeline Events ───
// Closed set of notifications the installer worker emits while it works.
// Delivered over a FIFO channel; the supervisor relies on arrival order to
// tell apart event kinds that fire more than once (see pipeline.rs).

use std::sync::mpsc::{Receiver, SyncSender};

/// Depth of the worker-to-supervisor queue. A full queue applies
/// backpressure to the worker instead of growing without bound.
const EVENT_QUEUE_CAPACITY: usize = 64;

/// One notification from the installation worker.
#[derive(Debug, Clone, PartialEq)]
pub enum InstallEvent {
    /// Version metadata resolved. Fires once per version taking part in
    /// the install: twice on the modded path (engine first, then the base
    /// game), once on the vanilla path.
    MetadataLoaded,
    /// The game jar was located (or downloaded) and verified.
    JarFound,
    /// The library graph was resolved.
    LibrariesResolved,
    /// A download batch is starting. Fires once per batch; the modded path
    /// has two batches (engine payload, then base game assets).
    DownloadStart { entries_count: usize },
    /// Periodic tick within the current download batch.
    DownloadProgress { count: usize, speed: f64 },
    /// The current download batch finished.
    DownloadComplete,
    /// Engine post-processors (installer "compile" step) finished.
    PostProcessed,
}

/// Sending half handed to the worker. Send failures are ignored: a closed
/// receiver means the supervisor is gone and nobody is listening anymore.
#[derive(Clone)]
pub struct EventSink {
    tx: SyncSender<InstallEvent>,
}

impl EventSink {
    pub fn emit(&self, event: InstallEvent) {
        let _ = self.tx.send(event);
    }
}

pub fn event_channel() -> (EventSink, Receiver<InstallEvent>) {
    let (tx, rx) = std::sync::mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
    (EventSink { tx }, rx)
}
