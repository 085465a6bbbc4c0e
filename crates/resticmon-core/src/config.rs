//! Configuration model for resticmon
//!
//! The config file is a YAML document declaring backup jobs, the restic
//! environment overlay, and optional host-identity overrides. It is loaded
//! once at process start and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{ResticmonError, Result};

/// Top-level resticmon configuration
///
/// Loaded from `config.yml` (or the path given with `--config`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backup job definitions, keyed by job name
    pub backups: BTreeMap<String, JobDefinition>,

    /// Environment overlay applied to every restic invocation
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Optional overrides for derived runtime values
    #[serde(default)]
    pub overrides: Option<Overrides>,

    /// Zabbix trapper endpoint
    #[serde(default)]
    pub zabbix: ZabbixConfig,

    /// Path to the restic binary
    #[serde(default = "default_restic_path")]
    pub restic_path: PathBuf,
}

/// One named backup job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Paths handed to `restic backup`, in order
    pub source: Vec<String>,

    /// `--exclude` patterns, in order
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// Per-job environment overlay (wins over the global `env` block)
    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,

    /// Shell commands run before/after the backup
    #[serde(default)]
    pub hooks: Option<Hooks>,

    /// Declared retention policy; carried but not enforced
    #[serde(default)]
    pub retention: Option<RetentionPolicy>,
}

/// Pre/post hook shell commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hooks {
    #[serde(default)]
    pub pre: Option<String>,

    #[serde(default)]
    pub post: Option<String>,
}

/// Retention counts per bucket, as restic `--keep-within-*` durations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionPolicy {
    #[serde(default)]
    pub daily: Option<String>,

    #[serde(default)]
    pub weekly: Option<String>,

    #[serde(default)]
    pub monthly: Option<String>,

    #[serde(default)]
    pub yearly: Option<String>,
}

/// Overrides for values otherwise derived from the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overrides {
    /// Replaces the derived FQDN used as the Zabbix host dimension
    #[serde(default)]
    pub hostname_fqdn: Option<String>,
}

/// Zabbix trapper endpoint address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZabbixConfig {
    #[serde(default = "default_zabbix_server")]
    pub server: String,

    #[serde(default = "default_zabbix_port")]
    pub port: u16,
}

// Default value providers
fn default_restic_path() -> PathBuf {
    PathBuf::from("/usr/local/bin/restic")
}

fn default_zabbix_server() -> String {
    "127.0.0.1".to_string()
}

fn default_zabbix_port() -> u16 {
    10051
}

impl Default for ZabbixConfig {
    fn default() -> Self {
        Self {
            server: default_zabbix_server(),
            port: default_zabbix_port(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// Fails with `ResticmonError::Config` if the file is missing or does
    /// not parse as a mapping of the expected shape.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ResticmonError::Config(format!(
                "Config file {} doesn't exist",
                path.display()
            )));
        }

        info!("Reading config file {}", path.display());

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a YAML string
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ResticmonError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Look up one job definition by name
    pub fn job(&self, name: &str) -> Result<&JobDefinition> {
        self.backups
            .get(name)
            .ok_or_else(|| ResticmonError::JobNotFound(name.to_string()))
    }

    /// All configured job names, for discovery publication
    pub fn job_names(&self) -> Vec<&str> {
        self.backups.keys().map(String::as_str).collect()
    }
}
