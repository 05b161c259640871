use std::sync::Arc;
use std::time::Duration;

use metrix_core::error::Result;
use metrix_core::store::Repository;

use crate::stats::StatsSource;

pub const POLL_COUNT: &str = "PollCount";
pub const RANDOM_VALUE: &str = "RandomValue";

/// Writes one round of local observations into the store per poll.
pub struct Sampler {
    store: Arc<dyn Repository>,
    stats: Arc<dyn StatsSource>,
    period: Duration,
}

impl Sampler {
    pub fn new(store: Arc<dyn Repository>, stats: Arc<dyn StatsSource>, period: Duration) -> Self {
        Self { store, stats, period }
    }

    /// `PollCount += 1`, every runtime gauge, and a fresh `RandomValue` in [0, 1).
    pub fn poll_once(&self) -> Result<()> {
        self.store.incr_counter(POLL_COUNT)?;
        for (name, value) in self.stats.sample() {
            self.store.set_gauge(name, value)?;
        }
        self.store.set_gauge(RANDOM_VALUE, rand::random::<f64>())?;
        Ok(())
    }

    /// Poll, sleep, repeat. Never returns.
    pub async fn run(self) {
        loop {
            if let Err(e) = self.poll_once() {
                tracing::warn!(code = e.code().as_str(), error = %e, "sample failed");
            }
            tokio::time::sleep(self.period).await;
        }
    }
}
