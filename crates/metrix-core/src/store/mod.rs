//! Capability-scoped metric storage.
//!
//! Consumers depend on the narrowest trait they need, so an alternative backend
//! can implement only the subset it supports:
//! - `MetricWriter`: merge-add counters, overwrite gauges.
//! - `CounterIncrementer`: `+1` sugar for counters.
//! - `MetricReader`: point lookups and isolated map exports.
//! - `MetricRestorer`: atomic replacement of both maps.
//!
//! `Repository` is the union and is implemented for every type that has all four.

pub mod memory;

use std::collections::HashMap;

use crate::error::Result;

pub use memory::MemStorage;

pub trait MetricWriter: Send + Sync {
    /// Add `delta` to the counter `name` (absent counts as 0).
    fn set_counter(&self, name: &str, delta: i64) -> Result<()>;
    /// Overwrite the gauge `name`.
    fn set_gauge(&self, name: &str, value: f64) -> Result<()>;
}

pub trait CounterIncrementer: Send + Sync {
    fn incr_counter(&self, name: &str) -> Result<()>;
}

pub trait MetricReader: Send + Sync {
    /// `NotFound` when the counter is absent.
    fn get_counter(&self, name: &str) -> Result<i64>;
    /// `NotFound` when the gauge is absent.
    fn get_gauge(&self, name: &str) -> Result<f64>;
    /// Independent copy of all counters.
    fn export_counters(&self) -> Result<HashMap<String, i64>>;
    /// Independent copy of all gauges.
    fn export_gauges(&self) -> Result<HashMap<String, f64>>;

    /// Both maps copied from the same point in time.
    ///
    /// The default copies them one after the other; backends that can do
    /// better should override it.
    fn export_all(&self) -> Result<(HashMap<String, i64>, HashMap<String, f64>)> {
        Ok((self.export_counters()?, self.export_gauges()?))
    }
}

pub trait MetricRestorer: Send + Sync {
    /// Replace both maps in one step.
    fn restore_all(&self, counters: HashMap<String, i64>, gauges: HashMap<String, f64>) -> Result<()>;
}

pub trait Repository: MetricWriter + CounterIncrementer + MetricReader + MetricRestorer {}

impl<T> Repository for T where T: MetricWriter + CounterIncrementer + MetricReader + MetricRestorer {}
