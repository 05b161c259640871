//! metrix core: metric model, wire contracts, storage traits, and snapshots.
//!
//! This crate defines the pieces shared by the collector and the agent: the
//! per-metric wire record, the gzip codec used on the wire, the capability-scoped
//! store traits with their in-memory implementation, and the snapshot format
//! used for persistence. It intentionally carries no HTTP or async runtime
//! dependencies so both binaries can reuse it unchanged.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `MetrixError`/`Result` so malformed input never brings a process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod snapshot;
pub mod store;

/// Shared result type.
pub use error::{MetrixError, Result};
