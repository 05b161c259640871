//! Agent config: defaults < YAML file < flags < environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use metrix_core::error::{MetrixError, Result};
use serde::Deserialize;

/// Samples local process statistics and pushes them to a metrix collector.
#[derive(Debug, Default, Parser)]
#[command(name = "metrix-agent", version, about)]
pub struct Args {
    /// Optional YAML config file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Collector address, host:port or URL. ENV: ADDRESS
    #[arg(short = 'a', long)]
    pub address: Option<String>,

    /// Seconds between samples. ENV: POLL_INTERVAL
    #[arg(short = 'p', long)]
    pub poll_interval: Option<u64>,

    /// Seconds between reports. ENV: REPORT_INTERVAL
    #[arg(short = 'r', long)]
    pub report_interval: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            poll_interval: default_poll_interval(),
            report_interval: default_report_interval(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(MetrixError::Config("address must not be empty".into()));
        }
        if self.poll_interval == 0 {
            return Err(MetrixError::Config("poll_interval must be > 0".into()));
        }
        if self.report_interval == 0 {
            return Err(MetrixError::Config("report_interval must be > 0".into()));
        }
        Ok(())
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn report_period(&self) -> Duration {
        Duration::from_secs(self.report_interval)
    }

    /// JSON update endpoint on the collector.
    pub fn endpoint_url(&self) -> String {
        let base = self.address.trim().trim_end_matches('/');
        if base.contains("://") {
            format!("{base}/update/")
        } else {
            format!("http://{base}/update/")
        }
    }
}

fn default_address() -> String {
    "localhost:8080".into()
}
fn default_poll_interval() -> u64 {
    2
}
fn default_report_interval() -> u64 {
    10
}

pub fn load_from_file(path: &Path) -> Result<AgentConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetrixError::Config(format!("read config {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AgentConfig> {
    let cfg: AgentConfig = serde_yaml::from_str(s)
        .map_err(|e| MetrixError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Merge all sources. `env` looks up one variable; empty values count as unset.
pub fn resolve<F>(args: &Args, env: F) -> Result<AgentConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match &args.config {
        Some(path) => load_from_file(path)?,
        None => AgentConfig::default(),
    };

    if let Some(v) = &args.address {
        cfg.address = v.clone();
    }
    if let Some(v) = args.poll_interval {
        cfg.poll_interval = v;
    }
    if let Some(v) = args.report_interval {
        cfg.report_interval = v;
    }

    let lookup = |key: &str| env(key).filter(|v| !v.is_empty());
    if let Some(v) = lookup("ADDRESS") {
        cfg.address = v;
    }
    if let Some(v) = lookup("POLL_INTERVAL") {
        cfg.poll_interval = parse_secs("POLL_INTERVAL", &v)?;
    }
    if let Some(v) = lookup("REPORT_INTERVAL") {
        cfg.report_interval = parse_secs("REPORT_INTERVAL", &v)?;
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Parse flags and read the process environment.
pub fn from_process() -> Result<AgentConfig> {
    resolve(&Args::parse(), |key| std::env::var(key).ok())
}

fn parse_secs(key: &str, v: &str) -> Result<u64> {
    v.trim()
        .parse()
        .map_err(|e| MetrixError::Config(format!("{key}={v:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = resolve(&Args::default(), env_of(&[])).unwrap();
        assert_eq!(cfg, AgentConfig::default());
        assert_eq!(cfg.poll_period(), Duration::from_secs(2));
        assert_eq!(cfg.report_period(), Duration::from_secs(10));
        assert_eq!(cfg.endpoint_url(), "http://localhost:8080/update/");
    }

    #[test]
    fn env_beats_flags() {
        let args = Args {
            address: Some("flag:1".into()),
            poll_interval: Some(5),
            report_interval: Some(50),
            ..Args::default()
        };
        let cfg = resolve(
            &args,
            env_of(&[("ADDRESS", "env:2"), ("POLL_INTERVAL", "1"), ("REPORT_INTERVAL", "")]),
        )
        .unwrap();
        assert_eq!(cfg.address, "env:2");
        assert_eq!(cfg.poll_interval, 1);
        assert_eq!(cfg.report_interval, 50);
    }

    #[test]
    fn zero_or_garbage_intervals_are_rejected() {
        let err = resolve(&Args::default(), env_of(&[("POLL_INTERVAL", "0")])).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIG");
        let err = resolve(&Args::default(), env_of(&[("REPORT_INTERVAL", "ten")])).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIG");
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        assert!(load_from_str("report_interval: 3\n").is_ok());
        let err = load_from_str("pol_interval: 3\n").unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIG");
    }

    #[test]
    fn endpoint_keeps_an_explicit_scheme() {
        let cfg = AgentConfig {
            address: "https://collector.internal:8443/".into(),
            ..AgentConfig::default()
        };
        assert_eq!(cfg.endpoint_url(), "https://collector.internal:8443/update/");
    }
}
