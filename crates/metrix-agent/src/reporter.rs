//! Drains the local store to the collector.
//!
//! Each metric is one request: JSON record, gzip body, `POST` to the update
//! endpoint. A push either lands or is logged and retried on the next cycle
//! with whatever has accumulated since.
//!
//! Counters travel as deltas. After the collector accepts a counter the exact
//! pushed amount is subtracted locally, so increments made by the sampler
//! while the request was in flight are kept for the next report. Counters
//! with nothing new are skipped. Gauges are always sent.

use std::sync::Arc;
use std::time::Duration;

use metrix_core::error::{MetrixError, Result};
use metrix_core::protocol::{gzip, Metric};
use metrix_core::store::Repository;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;

/// Per-request timeout.
pub const PUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one report cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub sent: usize,
    pub failed: usize,
}

pub struct Reporter {
    store: Arc<dyn Repository>,
    client: reqwest::Client,
    endpoint: String,
    period: Duration,
}

impl Reporter {
    pub fn new(store: Arc<dyn Repository>, endpoint: impl Into<String>, period: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PUSH_TIMEOUT)
            .build()
            .map_err(|e| MetrixError::Internal(format!("http client init failed: {e}")))?;
        Ok(Self {
            store,
            client,
            endpoint: endpoint.into(),
            period,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one record. Anything but `200 OK` is a transport error.
    pub async fn push(&self, metric: &Metric) -> Result<()> {
        let body = gzip::compress(&metric.to_json()?)?;

        let res = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_ENCODING, "gzip")
            .body(body)
            .send()
            .await
            .map_err(|e| MetrixError::Transport(format!("POST {} failed: {e}", self.endpoint)))?;

        if res.status() != StatusCode::OK {
            return Err(MetrixError::Transport(format!(
                "POST {} answered {}",
                self.endpoint,
                res.status()
            )));
        }
        Ok(())
    }

    /// Push every metric once. Fails only if the local store cannot be read.
    pub async fn report_once(&self) -> Result<ReportSummary> {
        let (counters, gauges) = self.store.export_all()?;
        let mut summary = ReportSummary::default();

        let mut counters: Vec<_> = counters.into_iter().filter(|(_, d)| *d != 0).collect();
        counters.sort();
        for (name, delta) in counters {
            match self.push(&Metric::counter(&name, delta)).await {
                Ok(()) => {
                    summary.sent += 1;
                    self.store.set_counter(&name, delta.wrapping_neg())?;
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(metric = %name, code = e.code().as_str(), error = %e, "counter push failed");
                }
            }
        }

        let mut gauges: Vec<_> = gauges.into_iter().collect();
        gauges.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in gauges {
            match self.push(&Metric::gauge(&name, value)).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(metric = %name, code = e.code().as_str(), error = %e, "gauge push failed");
                }
            }
        }

        Ok(summary)
    }

    /// Sleep, report, repeat. Never returns.
    pub async fn run(self) {
        loop {
            tokio::time::sleep(self.period).await;
            match self.report_once().await {
                Ok(s) => tracing::debug!(sent = s.sent, failed = s.failed, "report cycle done"),
                Err(e) => tracing::warn!(code = e.code().as_str(), error = %e, "report cycle skipped"),
            }
        }
    }
}
