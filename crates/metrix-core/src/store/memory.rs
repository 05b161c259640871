//! In-memory store guarded by a single reader/writer lock.
//!
//! Both maps live behind one `RwLock`, so `restore_all` swaps them under a
//! single write guard and readers never see counters from one epoch next to
//! gauges from another. Exports clone under the read guard.
//!
//! Lock poisoning is recovered: every critical section is a single map
//! operation, so the maps are valid even if a holder panicked.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{MetrixError, Result};
use crate::store::{CounterIncrementer, MetricReader, MetricRestorer, MetricWriter};

#[derive(Debug, Default)]
struct Maps {
    counters: HashMap<String, i64>,
    gauges: HashMap<String, f64>,
}

#[derive(Debug, Default)]
pub struct MemStorage {
    maps: RwLock<Maps>,
    gauge_precision: Option<u32>,
}

impl MemStorage {
    /// Empty store that keeps gauges exactly as written.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store that rounds gauges to `digits` decimals before storing.
    pub fn with_gauge_precision(digits: u32) -> Self {
        Self {
            maps: RwLock::default(),
            gauge_precision: Some(digits),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Maps> {
        self.maps.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Maps> {
        self.maps.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn normalize_gauge(&self, value: f64) -> f64 {
        match self.gauge_precision {
            Some(digits) => round_to(value, digits),
            None => value,
        }
    }
}

/// Round half away from zero to `digits` decimals.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let pow = 10f64.powi(digits as i32);
    let scaled = (value * pow).round() / pow;
    if scaled.is_finite() {
        scaled
    } else {
        value
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MetrixError::BadInput("metric name must not be empty".into()));
    }
    Ok(())
}

impl MetricWriter for MemStorage {
    fn set_counter(&self, name: &str, delta: i64) -> Result<()> {
        check_name(name)?;
        let mut maps = self.write();
        let slot = maps.counters.entry(name.to_string()).or_insert(0);
        // Wrapping keeps add/subtract exact inverses.
        *slot = slot.wrapping_add(delta);
        Ok(())
    }

    fn set_gauge(&self, name: &str, value: f64) -> Result<()> {
        check_name(name)?;
        if !value.is_finite() {
            return Err(MetrixError::BadInput(format!(
                "gauge {name} must be finite, got {value}"
            )));
        }
        let value = self.normalize_gauge(value);
        self.write().gauges.insert(name.to_string(), value);
        Ok(())
    }
}

impl CounterIncrementer for MemStorage {
    fn incr_counter(&self, name: &str) -> Result<()> {
        self.set_counter(name, 1)
    }
}

impl MetricReader for MemStorage {
    fn get_counter(&self, name: &str) -> Result<i64> {
        self.read()
            .counters
            .get(name)
            .copied()
            .ok_or_else(|| MetrixError::NotFound(format!("counter {name}")))
    }

    fn get_gauge(&self, name: &str) -> Result<f64> {
        self.read()
            .gauges
            .get(name)
            .copied()
            .ok_or_else(|| MetrixError::NotFound(format!("gauge {name}")))
    }

    fn export_counters(&self) -> Result<HashMap<String, i64>> {
        Ok(self.read().counters.clone())
    }

    fn export_gauges(&self) -> Result<HashMap<String, f64>> {
        Ok(self.read().gauges.clone())
    }

    fn export_all(&self) -> Result<(HashMap<String, i64>, HashMap<String, f64>)> {
        let maps = self.read();
        Ok((maps.counters.clone(), maps.gauges.clone()))
    }
}

impl MetricRestorer for MemStorage {
    fn restore_all(&self, counters: HashMap<String, i64>, gauges: HashMap<String, f64>) -> Result<()> {
        if counters.keys().chain(gauges.keys()).any(|k| k.is_empty()) {
            return Err(MetrixError::BadInput("snapshot contains an empty metric name".into()));
        }
        let gauges = gauges
            .into_iter()
            .map(|(k, v)| (k, self.normalize_gauge(v)))
            .collect();
        let fresh = Maps { counters, gauges };
        tracing::debug!(
            counters = fresh.counters.len(),
            gauges = fresh.gauges.len(),
            "store restored"
        );
        *self.write() = fresh;
        Ok(())
    }
}
