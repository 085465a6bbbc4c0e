//! # resticmon-zabbix
//!
//! Telemetry sink for resticmon: the `MetricSink` trait, a real sender
//! speaking the Zabbix trapper ("sender data") protocol over TCP, and a
//! recording mock for tests.
//!
//! Telemetry is observability, not business logic: the `Reporter` wrapper
//! used by the runner logs delivery failures and never propagates them.

mod protocol;
mod reporter;
mod sender;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use resticmon_core::{Metric, MetricBatch, Result};

pub use protocol::{SenderRequest, SenderResponse};
pub use reporter::{epoch_now, Reporter};
pub use sender::ZabbixSender;

/// A sink accepting metric batches for one host
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// Deliver one batch atomically (a single network call)
    async fn send(&self, host: &str, metrics: &[Metric]) -> Result<()>;
}

/// In-memory sink for tests; records every batch it receives
#[derive(Clone, Default)]
pub struct RecordingSink {
    batches: Arc<Mutex<Vec<(String, MetricBatch)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded (host, batch) pairs, in send order
    pub fn batches(&self) -> Vec<(String, MetricBatch)> {
        self.batches.lock().unwrap().clone()
    }

    /// All recorded metrics flattened across batches, in send order
    pub fn all_metrics(&self) -> Vec<Metric> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, batch)| batch.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl MetricSink for RecordingSink {
    async fn send(&self, host: &str, metrics: &[Metric]) -> Result<()> {
        self.batches
            .lock()
            .unwrap()
            .push((host.to_string(), metrics.to_vec()));
        Ok(())
    }
}

/// Sink that fails every send; for exercising delivery-failure paths
#[derive(Clone, Default)]
pub struct FailingSink;

#[async_trait]
impl MetricSink for FailingSink {
    async fn send(&self, _host: &str, _metrics: &[Metric]) -> Result<()> {
        Err(resticmon_core::ResticmonError::Sink(
            "connection refused".to_string(),
        ))
    }
}
