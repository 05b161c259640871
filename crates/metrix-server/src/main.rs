//! metrix collector
//!
//! - HTTP API over an in-memory counter/gauge store
//! - Optional snapshot file: restored at boot, flushed periodically or per write
//! - SIGINT/SIGTERM/SIGQUIT: stop accepting, final flush, drain, exit 0

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metrix_server::{config, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::from_process()?;
    let listener = tokio::net::TcpListener::bind(&cfg.address)
        .await
        .with_context(|| format!("bind {}", cfg.address))?;

    server::run(cfg, listener, shutdown_signal()).await
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        let mut quit = signal(SignalKind::quit())?;
        tokio::select! {
            r = tokio::signal::ctrl_c() => r?,
            _ = terminate.recv() => {},
            _ = quit.recv() => {},
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
