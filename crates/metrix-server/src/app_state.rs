//! Shared application state for the collector.
//!
//! The store is constructed once by the binary and injected here; handlers
//! only ever see it through the `Repository` capability traits.

use std::sync::Arc;

use metrix_core::store::Repository;

use crate::persist::FileStore;

/// When snapshots are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// No persistence at all.
    Disabled,
    /// Background worker owns the schedule.
    Periodic,
    /// Every mutating request writes the snapshot before responding.
    Synchronous,
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Repository>,
    file: Option<Arc<FileStore>>,
    mode: FlushMode,
}

impl AppState {
    /// State without persistence.
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                file: None,
                mode: FlushMode::Disabled,
            }),
        }
    }

    /// State that persists to `file` according to `mode`.
    pub fn with_persistence(store: Arc<dyn Repository>, file: Arc<FileStore>, mode: FlushMode) -> Self {
        let file = (mode != FlushMode::Disabled).then_some(file);
        Self {
            inner: Arc::new(AppStateInner { store, file, mode }),
        }
    }

    pub fn store(&self) -> &dyn Repository {
        self.inner.store.as_ref()
    }

    pub fn mode(&self) -> FlushMode {
        self.inner.mode
    }

    /// Called after every applied mutation. In synchronous mode this writes the
    /// snapshot; a failure is logged and the request still succeeds.
    pub async fn after_write(&self) {
        if self.inner.mode != FlushMode::Synchronous {
            return;
        }
        let Some(file) = &self.inner.file else { return };
        if let Err(e) = file.save(self.store()).await {
            tracing::warn!(code = e.code().as_str(), error = %e, "synchronous snapshot failed");
        }
    }
}
