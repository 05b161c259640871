//! Wire protocol shared by the agent and the collector.
//!
//! - `metric`: the per-metric JSON record `{id, type, delta?, value?}`.
//! - `gzip`: body compression used on every agent push.
//!
//! Decoders are panic-free: malformed input is reported as `MetrixError::BadInput`.

pub mod gzip;
pub mod metric;

pub use metric::{Metric, MetricKind};
