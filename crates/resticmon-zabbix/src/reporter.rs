//! Batch dispatch with report-time stamping
//!
//! Every batch leaving the process is prefixed with
//! `restic.last_report.time`, and every status emission is paired with
//! `restic.last_report.job` so the backend can tell which job reported
//! last. Delivery is fail-open: a sink error is logged and swallowed, since
//! losing a metric must never fail a backup.

use chrono::Utc;
use tracing::warn;

use resticmon_core::{
    job_key, JobStatus, Metric, MetricBatch, KEY_LAST_REPORT_JOB, KEY_LAST_REPORT_TIME,
};

use crate::MetricSink;

/// Current report clock in epoch seconds
pub fn epoch_now() -> i64 {
    Utc::now().timestamp()
}

/// Fail-open dispatcher binding a sink to the telemetry host dimension
pub struct Reporter<S> {
    sink: S,
    host: String,
}

impl<S: MetricSink> Reporter<S> {
    pub fn new(sink: S, host: impl Into<String>) -> Self {
        Self {
            sink,
            host: host.into(),
        }
    }

    /// Send one batch, prefixed with the report timestamp
    ///
    /// Failures are logged, never returned.
    pub async fn report(&self, batch: MetricBatch) {
        let mut stamped = Vec::with_capacity(batch.len() + 1);
        stamped.push(Metric::new(KEY_LAST_REPORT_TIME, epoch_now()));
        stamped.extend(batch);

        if let Err(e) = self.sink.send(&self.host, &stamped).await {
            warn!("Metric delivery failed (continuing): {}", e);
        }
    }

    /// Send a job status change plus the last-report job marker
    pub async fn report_status(&self, job: &str, status: JobStatus) {
        self.report(vec![
            Metric::new(job_key(job, "status"), status.to_string()),
            Metric::new(KEY_LAST_REPORT_JOB, job),
        ])
        .await;
    }
}
