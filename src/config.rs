//! Configuration for triagectl.
//!
//! Loaded from `~/.triagectl/config.yaml` when present; every field has a
//! sensible default so a missing or partial file just works.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Triage session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Workspace whose approvals are triaged
    pub workspace: String,

    /// Grace period before a decision is durably submitted (milliseconds)
    pub grace_ms: u64,

    /// Override for the outbox queue file (default: ~/.triagectl/outbox.jsonl)
    pub outbox_path: Option<PathBuf>,

    /// Unix socket of the governance daemon. When unset, every decision
    /// queues for later replay.
    pub endpoint_socket: Option<PathBuf>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            workspace: "default".to_string(),
            grace_ms: crate::triage::types::DEFAULT_GRACE_MS,
            outbox_path: None,
            endpoint_socket: None,
        }
    }
}

impl TriageConfig {
    /// Load the config from the default location, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load the config from a specific path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: TriageConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config YAML: {}", path.display()))?;
        Ok(config)
    }

    /// Default config file (~/.triagectl/config.yaml).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".triagectl").join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TriageConfig::default();
        assert_eq!(config.workspace, "default");
        assert_eq!(config.grace_ms, 5_000);
        assert!(config.endpoint_socket.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "workspace: prod\ngrace_ms: 2500").unwrap();

        let config = TriageConfig::load_from(&path).unwrap();
        assert_eq!(config.workspace, "prod");
        assert_eq!(config.grace_ms, 2_500);
        assert!(config.outbox_path.is_none());
    }

    #[test]
    fn test_invalid_yaml_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "workspace: [not, a, string").unwrap();

        assert!(TriageConfig::load_from(&path).is_err());
    }
}
