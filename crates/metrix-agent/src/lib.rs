//! metrix agent library entry.
//!
//! The agent owns one local store and runs two independent loops over it:
//! the sampler writes process statistics into the store, and the reporter
//! drains it to the collector as gzip-compressed JSON records.

// Heap gauges come from jemalloc, so it must own the heap.
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

pub mod agent;
pub mod config;
pub mod reporter;
pub mod sampler;
pub mod stats;

pub use agent::Agent;
pub use config::AgentConfig;
