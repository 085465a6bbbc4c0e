//! End-to-end runner tests against a fake restic
//!
//! The fake is a shell script that replays canned stdout/stderr and exits
//! with a chosen code; the sink is the in-memory recorder. Scripts only use
//! shell builtins since the child environment is built from scratch.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use resticmon_core::{Config, JobStatus, Metric, ResticmonError, RuntimeContext};
use resticmon_runner::JobRunner;
use resticmon_zabbix::{RecordingSink, Reporter};

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-restic.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();

    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();

    path
}

fn config_with(restic_path: &Path, job_yaml: &str) -> Config {
    Config::parse(&format!(
        r#"
restic_path: {}
overrides:
  hostname_fqdn: testhost
backups:
  daily:
{}
"#,
        restic_path.display(),
        job_yaml
    ))
    .unwrap()
}

async fn run_job(config: &Config, sink: &RecordingSink) -> Result<JobStatus, ResticmonError> {
    let ctx = RuntimeContext::from_config(config);
    let reporter = Reporter::new(sink.clone(), ctx.hostname_fqdn.clone());
    JobRunner::new(&ctx, config, &reporter).run("daily").await
}

fn statuses(sink: &RecordingSink) -> Vec<String> {
    sink.all_metrics()
        .iter()
        .filter(|m| m.key == "restic.backup[daily,status]")
        .map(|m| m.value.to_string())
        .collect()
}

fn metrics_with_key(sink: &RecordingSink, key: &str) -> Vec<Metric> {
    sink.all_metrics()
        .into_iter()
        .filter(|m| m.key == key)
        .collect()
}

#[tokio::test]
async fn test_clean_run_streams_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        r#"echo '{"message_type":"status","percent_done":0.5,"total_files":2,"files_done":1}'
echo 'this is not json'
echo '{"message_type":"summary","total_files_processed":2,"total_bytes_processed":100,"snapshot_id":"abc123"}'
exit 0"#,
    );
    let config = config_with(&script, "    source: [/home]");
    let sink = RecordingSink::new();

    let status = run_job(&config, &sink).await.unwrap();
    assert_eq!(status, JobStatus::Success);

    assert_eq!(statuses(&sink), vec!["Starting", "Running", "Success"]);

    // streamed status event survived the garbage line in between
    let percent = metrics_with_key(&sink, "restic.backup[daily,percent_done]");
    assert_eq!(percent[0].value.to_string(), "50");
    // summary convergence
    assert_eq!(percent.last().unwrap().value.to_string(), "100");
    assert_eq!(
        metrics_with_key(&sink, "restic.backup[daily,files_done]")
            .last()
            .unwrap()
            .value
            .to_string(),
        "2"
    );
    assert_eq!(
        metrics_with_key(&sink, "restic.backup[daily,snapshot_id]")[0]
            .value
            .to_string(),
        "abc123"
    );

    // clean run: last_error is the empty string
    let last_error = metrics_with_key(&sink, "restic.backup[daily,last_error]");
    assert_eq!(last_error.len(), 1);
    assert_eq!(last_error[0].value.to_string(), "");

    // every batch went to the overridden host dimension
    for (host, _) in sink.batches() {
        assert_eq!(host, "testhost");
    }
}

#[tokio::test]
async fn test_stderr_downgrades_to_warning() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        r#"echo 'could not read /var/lib/private' >&2
exit 0"#,
    );
    let config = config_with(&script, "    source: [/var/lib]");
    let sink = RecordingSink::new();

    let status = run_job(&config, &sink).await.unwrap();
    assert_eq!(status, JobStatus::Warning);

    let last_error = metrics_with_key(&sink, "restic.backup[daily,last_error]");
    assert!(last_error[0]
        .value
        .to_string()
        .contains("could not read /var/lib/private"));
}

#[tokio::test]
async fn test_fatal_exit_fails() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "exit 1");
    let config = config_with(&script, "    source: [/home]");
    let sink = RecordingSink::new();

    let status = run_job(&config, &sink).await.unwrap();
    assert_eq!(status, JobStatus::Failed);
    assert_eq!(statuses(&sink), vec!["Starting", "Running", "Failed"]);
}

#[tokio::test]
async fn test_partial_exit_warns() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "exit 3");
    let config = config_with(&script, "    source: [/home]");
    let sink = RecordingSink::new();

    let status = run_job(&config, &sink).await.unwrap();
    assert_eq!(status, JobStatus::Warning);
}

#[tokio::test]
async fn test_pre_hook_failure_aborts_before_backup() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("backup-ran");
    let script = write_script(
        dir.path(),
        &format!("echo ran > {}\nexit 0", marker.display()),
    );
    let config = config_with(
        &script,
        r#"    source: [/home]
    hooks:
      pre: "exit 2""#,
    );
    let sink = RecordingSink::new();

    let err = run_job(&config, &sink).await.unwrap_err();
    assert!(matches!(err, ResticmonError::Hook(_)));

    // the backup child was never spawned
    assert!(!marker.exists());

    assert_eq!(
        statuses(&sink),
        vec!["Starting", "Running pre-hook", "Failed"]
    );
    let last_error = metrics_with_key(&sink, "restic.backup[daily,last_error]");
    assert_eq!(last_error[0].value.to_string(), "pre-hook failed");
}

#[tokio::test]
async fn test_post_hook_failure_overrides_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "exit 0");
    let config = config_with(
        &script,
        r#"    source: [/home]
    hooks:
      post: "exit 1""#,
    );
    let sink = RecordingSink::new();

    let err = run_job(&config, &sink).await.unwrap_err();
    assert!(matches!(err, ResticmonError::Hook(_)));

    assert_eq!(
        statuses(&sink),
        vec!["Starting", "Running", "Running post-hook", "Failed"]
    );
    assert_eq!(
        metrics_with_key(&sink, "restic.backup[daily,last_error]")
            .last()
            .unwrap()
            .value
            .to_string(),
        "post-hook failed"
    );
}

#[tokio::test]
async fn test_hooks_run_in_order_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "exit 0");
    let config = config_with(
        &script,
        r#"    source: [/home]
    hooks:
      pre: "true"
      post: "true""#,
    );
    let sink = RecordingSink::new();

    let status = run_job(&config, &sink).await.unwrap();
    assert_eq!(status, JobStatus::Success);
    assert_eq!(
        statuses(&sink),
        vec![
            "Starting",
            "Running pre-hook",
            "Running",
            "Running post-hook",
            "Success"
        ]
    );
}

#[tokio::test]
async fn test_child_env_overlay_precedence() {
    let dir = tempfile::tempdir().unwrap();
    // the child sees only the merged overlay; report it back over stderr
    let script = write_script(dir.path(), r#"echo "var=$PROBE" >&2
exit 0"#);
    let config = Config::parse(&format!(
        r#"
restic_path: {}
overrides:
  hostname_fqdn: testhost
env:
  PROBE: global
backups:
  daily:
    source: [/home]
    env:
      PROBE: job
"#,
        script.display()
    ))
    .unwrap();
    let sink = RecordingSink::new();

    let status = run_job(&config, &sink).await.unwrap();
    // stderr output downgrades to Warning, which is what lets us observe it
    assert_eq!(status, JobStatus::Warning);
    assert_eq!(
        metrics_with_key(&sink, "restic.backup[daily,last_error]")[0]
            .value
            .to_string(),
        "var=job"
    );
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "exit 0");
    let config = config_with(&script, "    source: [/home]");
    let sink = RecordingSink::new();

    let ctx = RuntimeContext::from_config(&config);
    let reporter = Reporter::new(sink.clone(), ctx.hostname_fqdn.clone());
    let err = JobRunner::new(&ctx, &config, &reporter)
        .run("hourly")
        .await
        .unwrap_err();

    assert!(matches!(err, ResticmonError::JobNotFound(_)));
    assert!(sink.batches().is_empty());
}
