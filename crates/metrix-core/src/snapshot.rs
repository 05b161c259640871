//! Point-in-time snapshot of both metric maps (persistence format).
//!
//! On disk this is one JSON object: `{"gauges": {name: float}, "counters": {name: int}}`.
//! Keys are kept sorted so consecutive files diff cleanly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MetrixError, Result};
use crate::store::{MetricReader, MetricRestorer};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub gauges: BTreeMap<String, f64>,
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
}

impl Snapshot {
    /// Copy both maps out of `reader` at one point in time.
    pub fn capture<R: MetricReader + ?Sized>(reader: &R) -> Result<Self> {
        let (counters, gauges) = reader.export_all()?;
        Ok(Self {
            gauges: gauges.into_iter().collect(),
            counters: counters.into_iter().collect(),
        })
    }

    /// Replace the contents of `restorer` with this snapshot.
    pub fn apply<R: MetricRestorer + ?Sized>(self, restorer: &R) -> Result<()> {
        restorer.restore_all(
            self.counters.into_iter().collect(),
            self.gauges.into_iter().collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.gauges.len() + self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| MetrixError::Persistence(format!("encode snapshot failed: {e}")))
    }

    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| MetrixError::Persistence(format!("decode snapshot failed: {e}")))
    }
}
