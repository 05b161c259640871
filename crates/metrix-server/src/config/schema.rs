use std::time::Duration;

use serde::Deserialize;
use metrix_core::error::{MetrixError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,

    /// Seconds between snapshot flushes; 0 flushes after every write.
    #[serde(default = "default_store_interval")]
    pub store_interval: u64,

    /// Snapshot file; empty disables persistence.
    #[serde(default = "default_file_storage_path")]
    pub file_storage_path: String,

    #[serde(default)]
    pub restore: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            store_interval: default_store_interval(),
            file_storage_path: default_file_storage_path(),
            restore: false,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(MetrixError::Config("address must not be empty".into()));
        }
        Ok(())
    }

    pub fn persistence_enabled(&self) -> bool {
        !self.file_storage_path.is_empty()
    }

    /// `None` means synchronous mode (flush after every write).
    pub fn flush_period(&self) -> Option<Duration> {
        (self.store_interval > 0).then(|| Duration::from_secs(self.store_interval))
    }
}

fn default_address() -> String {
    "localhost:8080".into()
}
fn default_store_interval() -> u64 {
    300
}
fn default_file_storage_path() -> String {
    "./db.json".into()
}
