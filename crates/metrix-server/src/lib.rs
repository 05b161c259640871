//! metrix collector library entry.
//!
//! Wires the shared metric store, the HTTP surface, and snapshot persistence
//! into one service. It is consumed by the binary (`main.rs`) and by the
//! integration tests, which mount the router or the whole `server::run`
//! lifecycle on an ephemeral port.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod persist;
pub mod router;
pub mod server;

/// Decimal places kept for gauges held by the collector.
pub const GAUGE_PRECISION: u32 = 3;
