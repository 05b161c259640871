use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use metrix_core::store::Repository;

use super::FileStore;

/// Background flusher for `store_interval > 0`.
///
/// Flushes every `period`; when the shutdown channel flips to `true` (or its
/// sender is dropped) it flushes once more and exits. A failed flush is logged
/// and retried on the next tick.
pub struct PersistenceWorker {
    store: Arc<dyn Repository>,
    file: Arc<FileStore>,
    period: Duration,
}

impl PersistenceWorker {
    pub fn new(store: Arc<dyn Repository>, file: Arc<FileStore>, period: Duration) -> Self {
        Self { store, file, period }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut tick = tokio::time::interval(self.period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        tick.tick().await;

        tracing::info!(
            period_secs = self.period.as_secs(),
            path = %self.file.path().display(),
            "persistence worker started"
        );

        loop {
            tokio::select! {
                _ = tick.tick() => self.flush("tick").await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.flush("shutdown").await;
        tracing::info!("persistence worker stopped");
    }

    async fn flush(&self, reason: &'static str) {
        match self.file.save(self.store.as_ref()).await {
            Ok(n) => tracing::debug!(reason, metrics = n, "snapshot flushed"),
            Err(e) => tracing::warn!(reason, code = e.code().as_str(), error = %e, "snapshot flush failed"),
        }
    }
}
