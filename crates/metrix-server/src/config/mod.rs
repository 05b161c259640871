//! Collector config: defaults < YAML file < flags < environment.

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use metrix_core::error::{MetrixError, Result};

pub use schema::ServerConfig;

/// Metric collector service.
#[derive(Debug, Default, Parser)]
#[command(name = "metrix-server", version, about)]
pub struct Args {
    /// Optional YAML config file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Listen address. ENV: ADDRESS
    #[arg(short = 'a', long)]
    pub address: Option<String>,

    /// Snapshot interval in seconds, 0 = after every write. ENV: STORE_INTERVAL
    #[arg(short = 'i', long)]
    pub store_interval: Option<u64>,

    /// Snapshot file, empty disables persistence. ENV: FILE_STORAGE_PATH
    #[arg(short = 'f', long)]
    pub file_storage_path: Option<String>,

    /// Restore the snapshot at startup. ENV: RESTORE
    #[arg(short = 'r', long, num_args = 0..=1, default_missing_value = "true")]
    pub restore: Option<bool>,
}

pub fn load_from_file(path: &Path) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetrixError::Config(format!("read config {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| MetrixError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Merge all sources. `env` looks up one variable; empty values count as unset.
pub fn resolve<F>(args: &Args, env: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match &args.config {
        Some(path) => load_from_file(path)?,
        None => ServerConfig::default(),
    };

    if let Some(v) = &args.address {
        cfg.address = v.clone();
    }
    if let Some(v) = args.store_interval {
        cfg.store_interval = v;
    }
    if let Some(v) = &args.file_storage_path {
        cfg.file_storage_path = v.clone();
    }
    if let Some(v) = args.restore {
        cfg.restore = v;
    }

    let lookup = |key: &str| env(key).filter(|v| !v.is_empty());
    if let Some(v) = lookup("ADDRESS") {
        cfg.address = v;
    }
    if let Some(v) = lookup("STORE_INTERVAL") {
        cfg.store_interval = v
            .trim()
            .parse()
            .map_err(|e| MetrixError::Config(format!("STORE_INTERVAL={v:?}: {e}")))?;
    }
    if let Some(v) = lookup("FILE_STORAGE_PATH") {
        cfg.file_storage_path = v;
    }
    if let Some(v) = lookup("RESTORE") {
        cfg.restore = parse_bool(&v)
            .ok_or_else(|| MetrixError::Config(format!("RESTORE={v:?} is not a boolean")))?;
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Parse flags and read the process environment.
pub fn from_process() -> Result<ServerConfig> {
    resolve(&Args::parse(), |key| std::env::var(key).ok())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_usual_boolean_spellings() {
        for s in ["1", "t", "TRUE", "True"] {
            assert_eq!(parse_bool(s), Some(true), "{s}");
        }
        for s in ["0", "f", "false", "False"] {
            assert_eq!(parse_bool(s), Some(false), "{s}");
        }
        assert_eq!(parse_bool("yes"), None);
    }
}
