//! Projection of classified events into metric batches
//!
//! The mapping is deterministic: same event, same job, same clock, same
//! batch. Field order within a batch is insertion order; the sink attaches
//! no meaning to it.

use resticmon_core::{job_key, Metric, MetricBatch};

use crate::{ResticEvent, StatusEvent, SummaryEvent};

/// Project one classified event into the metrics it produces
///
/// `now` is the report wall-clock in epoch seconds, supplied by the caller.
/// An `Ignored` event projects to an empty batch.
pub fn project(job: &str, event: &ResticEvent, now: i64) -> MetricBatch {
    match event {
        ResticEvent::StatusUpdate(e) => project_status(job, e, now),
        ResticEvent::Summary(e) => project_summary(job, e, now),
        ResticEvent::Ignored => Vec::new(),
    }
}

fn project_status(job: &str, event: &StatusEvent, now: i64) -> MetricBatch {
    let mut batch = vec![Metric::new(job_key(job, "time"), now)];

    if let Some(percent) = event.percent_done {
        // Restic occasionally reports percentages above 1.0, and when it
        // does the elapsed/remaining fields are garbage too. All three are
        // gated on the percentage being in range.
        if (0.0..=1.0).contains(&percent) {
            batch.push(Metric::new(
                job_key(job, "percent_done"),
                (percent * 100.0).round() as i64,
            ));

            if let Some(elapsed) = event.elapsed_seconds {
                batch.push(Metric::new(job_key(job, "elapsed_seconds"), elapsed));
            }
            if let Some(remaining) = event.seconds_remaining {
                batch.push(Metric::new(job_key(job, "seconds_remaining"), remaining));
            }
        }
    }

    if let Some(total_files) = event.total_files {
        batch.push(Metric::new(job_key(job, "total_files"), total_files));
    }
    if let Some(files_done) = event.files_done {
        batch.push(Metric::new(job_key(job, "files_done"), files_done));
    }
    if let Some(total_bytes) = event.total_bytes {
        batch.push(Metric::new(job_key(job, "total_bytes"), total_bytes));
    }
    if let Some(bytes_done) = event.bytes_done {
        batch.push(Metric::new(job_key(job, "bytes_done"), bytes_done));
    }

    batch
}

fn project_summary(job: &str, event: &SummaryEvent, now: i64) -> MetricBatch {
    let mut batch = vec![Metric::new(job_key(job, "time"), now)];

    if let Some(files_new) = event.files_new {
        batch.push(Metric::new(job_key(job, "files_new"), files_new));
    }
    if let Some(files_changed) = event.files_changed {
        batch.push(Metric::new(job_key(job, "files_changed"), files_changed));
    }
    if let Some(files_unmodified) = event.files_unmodified {
        batch.push(Metric::new(
            job_key(job, "files_unmodified"),
            files_unmodified,
        ));
    }
    if let Some(dirs_new) = event.dirs_new {
        batch.push(Metric::new(job_key(job, "dirs_new"), dirs_new));
    }
    if let Some(dirs_changed) = event.dirs_changed {
        batch.push(Metric::new(job_key(job, "dirs_changed"), dirs_changed));
    }
    if let Some(dirs_unmodified) = event.dirs_unmodified {
        batch.push(Metric::new(
            job_key(job, "dirs_unmodified"),
            dirs_unmodified,
        ));
    }
    if let Some(data_added) = event.data_added {
        batch.push(Metric::new(job_key(job, "data_added"), data_added));
    }

    // The summary is the terminal status update, so the progress items
    // must converge on their done state as well.
    if let Some(total_files) = event.total_files_processed {
        batch.push(Metric::new(
            job_key(job, "total_files_processed"),
            total_files,
        ));
        batch.push(Metric::new(job_key(job, "files_done"), total_files));
    }
    if let Some(total_bytes) = event.total_bytes_processed {
        batch.push(Metric::new(
            job_key(job, "total_bytes_processed"),
            total_bytes,
        ));
        batch.push(Metric::new(job_key(job, "bytes_done"), total_bytes));
        batch.push(Metric::new(job_key(job, "total_bytes"), total_bytes));
    }
    if let Some(duration) = event.total_duration {
        batch.push(Metric::new(
            job_key(job, "elapsed_seconds"),
            duration.round() as i64,
        ));
    }
    if let Some(snapshot_id) = &event.snapshot_id {
        batch.push(Metric::new(job_key(job, "snapshot_id"), snapshot_id.clone()));
    }

    batch.push(Metric::new(job_key(job, "seconds_remaining"), 0i64));
    batch.push(Metric::new(job_key(job, "percent_done"), 100i64));

    batch
}
