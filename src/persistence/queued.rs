use super::{PersistenceError, SnapshotGateway};
use crate::models::Store;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};

enum SaveRequest {
    Snapshot(Box<Store>),
    Flush(oneshot::Sender<()>),
}

/// Moves saves off the caller's thread without reordering them.
///
/// `save` clones the store onto an unbounded channel and returns immediately.
/// A single worker task drains the channel in FIFO order and runs each save
/// on the blocking pool, one at a time, so an older snapshot can never land
/// after a newer one. Failures are logged and counted since the caller has
/// already moved on.
///
/// Two caveats follow from that:
///
/// - `Ok(())` from `save` means the snapshot was queued, not written. Write
///   errors only surface through [`failed_saves`](Self::failed_saves).
/// - `load` goes straight to the inner gateway and does not wait for queued
///   saves. Call [`flush`](Self::flush) first to read back the latest state.
pub struct QueuedGateway {
    inner: Arc<dyn SnapshotGateway>,
    tx: mpsc::UnboundedSender<SaveRequest>,
    failures: Arc<AtomicU64>,
}

impl QueuedGateway {
    /// Wrap `inner` and start the save worker on `handle`
    pub fn spawn(inner: Arc<dyn SnapshotGateway>, handle: &tokio::runtime::Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let failures = Arc::new(AtomicU64::new(0));

        handle.spawn(run_worker(Arc::clone(&inner), rx, Arc::clone(&failures)));

        Self {
            inner,
            tx,
            failures,
        }
    }

    /// Wait until every save queued before this call has been applied
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(SaveRequest::Flush(done_tx))
            .map_err(|_| worker_stopped())?;
        done_rx.await.map_err(|_| worker_stopped())
    }

    /// Background saves that failed so far
    pub fn failed_saves(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl SnapshotGateway for QueuedGateway {
    /// Reads the inner gateway; pending saves are not flushed
    fn load(&self) -> Result<Option<Store>, PersistenceError> {
        self.inner.load()
    }

    /// Queue `store` for the worker; an error only means the worker is gone
    fn save(&self, store: &Store) -> Result<(), PersistenceError> {
        self.tx
            .send(SaveRequest::Snapshot(Box::new(store.clone())))
            .map_err(|_| worker_stopped())
    }
}

fn worker_stopped() -> PersistenceError {
    PersistenceError::Unavailable("background save worker has stopped".to_string())
}

async fn run_worker(
    inner: Arc<dyn SnapshotGateway>,
    mut rx: mpsc::UnboundedReceiver<SaveRequest>,
    failures: Arc<AtomicU64>,
) {
    while let Some(request) = rx.recv().await {
        match request {
            SaveRequest::Snapshot(store) => {
                let gateway = Arc::clone(&inner);
                match tokio::task::spawn_blocking(move || gateway.save(&store)).await {
                    Ok(Ok(())) => tracing::trace!("Background snapshot saved"),
                    Ok(Err(e)) => {
                        failures.fetch_add(1, Ordering::Relaxed);
                        tracing::error!("Background snapshot save failed: {}", e);
                    }
                    Err(e) => {
                        failures.fetch_add(1, Ordering::Relaxed);
                        tracing::error!("Background snapshot task aborted: {}", e);
                    }
                }
            }
            SaveRequest::Flush(done) => {
                // Receiver may have given up waiting
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("Background save worker shutting down");
}
