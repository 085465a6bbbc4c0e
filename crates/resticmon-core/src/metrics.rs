//! Flat key/value telemetry model
//!
//! Zabbix consumes metrics as (host, key, value) triples. Per-job keys are
//! parameterized as `restic.backup[<job>,<field>]`; a handful of
//! process-scoped keys are unparameterized.

use serde::{Deserialize, Serialize};

/// Low-level-discovery key registering the configured job names
pub const KEY_PROFILES: &str = "restic.backup.profiles";

/// Version metric emitted alongside discovery
pub const KEY_VERSION: &str = "restic.backup.version";

/// Name of the job that most recently reported a status
pub const KEY_LAST_REPORT_JOB: &str = "restic.last_report.job";

/// Wall-clock stamp prepended to every batch
pub const KEY_LAST_REPORT_TIME: &str = "restic.last_report.time";

/// Build the per-job item key for one metric field
pub fn job_key(job: &str, field: &str) -> String {
    format!("restic.backup[{},{}]", job, field)
}

/// One metric value; rendered as a string on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One (key, value) pair bound for the sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub key: String,
    pub value: MetricValue,
}

impl Metric {
    pub fn new(key: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered batch of metrics, sent atomically
pub type MetricBatch = Vec<Metric>;
