//! Per-metric wire record.
//!
//! One record carries exactly one metric: counters travel in `delta`, gauges
//! in `value`. The unused field is omitted on encode and ignored on decode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MetrixError, Result};

/// Metric kind (field name is `type` in JSON and the `{type}` path segment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Additive signed 64-bit integer.
    Counter,
    /// Last-write-wins 64-bit float.
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "counter" => Ok(MetricKind::Counter),
            "gauge" => Ok(MetricKind::Gauge),
            other => Err(MetrixError::BadInput(format!("invalid metric type: {other}"))),
        }
    }
}

/// Wire record `{id, type, delta?, value?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name.
    pub id: String,
    /// Metric kind.
    #[serde(rename = "type")]
    pub kind: MetricKind,
    /// Counter increment (counters only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
    /// Gauge value (gauges only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Metric {
    pub fn counter(id: impl Into<String>, delta: i64) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Counter,
            delta: Some(delta),
            value: None,
        }
    }

    pub fn gauge(id: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Gauge,
            delta: None,
            value: Some(value),
        }
    }

    /// Decode one record from JSON bytes.
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| MetrixError::BadInput(format!("invalid metric json: {e}")))
    }

    /// Encode the record as JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| MetrixError::Internal(format!("encode metric failed: {e}")))
    }

    /// Counter increment, or `BadInput` if this is not a well-formed counter record.
    pub fn require_delta(&self) -> Result<i64> {
        match (self.kind, self.delta) {
            (MetricKind::Counter, Some(d)) => Ok(d),
            (MetricKind::Counter, None) => Err(MetrixError::BadInput(format!(
                "counter {} requires delta",
                self.id
            ))),
            (MetricKind::Gauge, _) => Err(MetrixError::BadInput(format!(
                "{} is a gauge, not a counter",
                self.id
            ))),
        }
    }

    /// Gauge value, or `BadInput` if this is not a well-formed gauge record.
    pub fn require_value(&self) -> Result<f64> {
        match (self.kind, self.value) {
            (MetricKind::Gauge, Some(v)) => Ok(v),
            (MetricKind::Gauge, None) => Err(MetrixError::BadInput(format!(
                "gauge {} requires value",
                self.id
            ))),
            (MetricKind::Counter, _) => Err(MetrixError::BadInput(format!(
                "{} is a counter, not a gauge",
                self.id
            ))),
        }
    }
}
