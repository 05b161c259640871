//! Agent root: owns the local store and hands it to both loops.

use std::sync::Arc;

use metrix_core::error::Result;
use metrix_core::store::{MemStorage, Repository};
use tokio::task::JoinHandle;

use crate::config::AgentConfig;
use crate::reporter::Reporter;
use crate::sampler::Sampler;
use crate::stats::{ProcStats, StatsSource};

pub struct Agent {
    store: Arc<dyn Repository>,
    sampler: Sampler,
    reporter: Reporter,
}

/// Both running loops.
pub struct AgentHandle {
    pub sampler: JoinHandle<()>,
    pub reporter: JoinHandle<()>,
}

impl AgentHandle {
    pub fn abort(&self) {
        self.sampler.abort();
        self.reporter.abort();
    }
}

impl Agent {
    pub fn new(cfg: &AgentConfig) -> Result<Self> {
        Self::with_stats(cfg, Arc::new(ProcStats))
    }

    pub fn with_stats(cfg: &AgentConfig, stats: Arc<dyn StatsSource>) -> Result<Self> {
        // Agent-side gauges are staged unrounded; the collector applies its own precision.
        let store: Arc<dyn Repository> = Arc::new(MemStorage::new());
        let sampler = Sampler::new(Arc::clone(&store), stats, cfg.poll_period());
        let reporter = Reporter::new(Arc::clone(&store), cfg.endpoint_url(), cfg.report_period())?;
        Ok(Self {
            store,
            sampler,
            reporter,
        })
    }

    pub fn store(&self) -> Arc<dyn Repository> {
        Arc::clone(&self.store)
    }

    /// Spawn the sampler and reporter on the current runtime.
    pub fn spawn(self) -> AgentHandle {
        tracing::info!(endpoint = self.reporter.endpoint(), "agent loops starting");
        AgentHandle {
            sampler: tokio::spawn(self.sampler.run()),
            reporter: tokio::spawn(self.reporter.run()),
        }
    }
}
