//! Collector lifecycle: boot, serve, ordered shutdown.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use metrix_core::store::{MemStorage, Repository};

use crate::app_state::{AppState, FlushMode};
use crate::config::ServerConfig;
use crate::persist::{FileStore, PersistenceWorker};
use crate::{router, GAUGE_PRECISION};

/// Bound on the final flush, and separately on draining in-flight requests.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Serve `listener` until `shutdown` resolves or the server fails.
///
/// Boot restores the snapshot when asked (a failure is logged and the store
/// starts empty) and picks the flush mode. On shutdown new connections are
/// refused, the worker's final flush is awaited, then in-flight requests get
/// up to [`SHUTDOWN_GRACE`].
pub async fn run<F>(cfg: ServerConfig, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = std::io::Result<()>> + Send,
{
    let store: Arc<dyn Repository> = Arc::new(MemStorage::with_gauge_precision(GAUGE_PRECISION));
    let (stop_tx, stop_rx) = watch::channel(false);
    let (state, worker) = boot(&cfg, store, stop_rx.clone()).await;
    tracing::info!(address = %cfg.address, mode = ?state.mode(), "metrix-server starting");

    let mut server_stop = stop_rx;
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router::build_router(state))
            .with_graceful_shutdown(async move {
                let _ = server_stop.wait_for(|stop| *stop).await;
            })
            .await
    });

    let exited_early = tokio::select! {
        sig = shutdown => {
            sig.context("signal handler")?;
            tracing::info!("shutdown requested");
            None
        }
        res = &mut server => Some(res),
    };

    let _ = stop_tx.send(true);
    if let Some(worker) = worker {
        if tokio::time::timeout(SHUTDOWN_GRACE, worker).await.is_err() {
            tracing::warn!("final snapshot did not complete within the grace period");
        }
    }

    match exited_early {
        Some(res) => res?.context("server failed")?,
        None => match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
            Ok(res) => res?.context("server failed")?,
            Err(_) => tracing::warn!("in-flight requests abandoned after the grace period"),
        },
    }

    tracing::info!("metrix-server stopped");
    Ok(())
}

async fn boot(
    cfg: &ServerConfig,
    store: Arc<dyn Repository>,
    stop: watch::Receiver<bool>,
) -> (AppState, Option<JoinHandle<()>>) {
    if !cfg.persistence_enabled() {
        return (AppState::new(store), None);
    }

    let file = Arc::new(FileStore::new(&cfg.file_storage_path));
    if cfg.restore {
        match file.restore(store.as_ref()).await {
            Ok(n) => tracing::info!(metrics = n, path = %cfg.file_storage_path, "snapshot restored"),
            Err(e) => tracing::warn!(code = e.code().as_str(), error = %e, "snapshot restore failed, starting empty"),
        }
    }

    match cfg.flush_period() {
        Some(period) => {
            let worker = PersistenceWorker::new(Arc::clone(&store), Arc::clone(&file), period).spawn(stop);
            (AppState::with_persistence(store, file, FlushMode::Periodic), Some(worker))
        }
        None => (AppState::with_persistence(store, file, FlushMode::Synchronous), None),
    }
}
