use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global cap on in-flight requests
    pub concurrency: u16,
    /// In-flight requests allowed against a single host
    pub per_host: u16,
    /// Hosts scanned at the same time
    pub parallel_hosts: u16,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self { concurrency: 50, per_host: 6, parallel_hosts: 4, timeout_secs: 10, connect_timeout_secs: 5 }
    }
}

impl Config {
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(cfg)
    }
}
