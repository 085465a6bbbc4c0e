//! # resticmon-core
//!
//! Core types for resticmon, a bridge between restic backup runs and a
//! Zabbix monitoring backend.
//!
//! ## Core Paradigm
//!
//! - Backup jobs are declared once in a YAML config and never mutated
//! - Every observable fact about a run travels as a (key, value) metric
//! - Job identity is the `--tag` passed to restic and the `{#PROFILE}`
//!   dimension registered with Zabbix discovery

mod config;
mod context;
mod error;
mod metrics;
mod status;

pub use config::{Config, Hooks, JobDefinition, Overrides, RetentionPolicy, ZabbixConfig};
pub use context::RuntimeContext;
pub use error::{Result, ResticmonError};
pub use metrics::{
    job_key, Metric, MetricBatch, MetricValue, KEY_LAST_REPORT_JOB, KEY_LAST_REPORT_TIME,
    KEY_PROFILES, KEY_VERSION,
};
pub use status::JobStatus;

/// Version reported under `restic.backup.version` on discovery publish.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
