use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metrix_agent::{config, Agent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::from_process().context("config")?;
    tracing::info!(
        address = %cfg.address,
        poll_interval = cfg.poll_interval,
        report_interval = cfg.report_interval,
        "agent config loaded"
    );

    let handle = Agent::new(&cfg).context("agent init")?.spawn();

    shutdown_signal().await.context("signal handler")?;
    tracing::info!("signal received, agent exiting");
    handle.abort();
    Ok(())
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
