//! Backup job lifecycle
//!
//! One invocation runs one job: Starting → (pre-hook) → Running →
//! (post-hook) → Success/Warning/Failed. Stdout is classified, projected,
//! and dispatched line-by-line while restic runs; stderr is buffered in
//! full and emitted as `last_error` once the stream closes.

use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use resticmon_core::{
    job_key, Config, JobDefinition, JobStatus, Metric, ResticmonError, Result, RuntimeContext,
};
use resticmon_events::{classify, project};
use resticmon_zabbix::{epoch_now, MetricSink, Reporter};

use crate::hooks::run_hook;

/// Drives one backup job to completion
pub struct JobRunner<'a, S> {
    ctx: &'a RuntimeContext,
    config: &'a Config,
    reporter: &'a Reporter<S>,
}

enum HookKind {
    Pre,
    Post,
}

impl HookKind {
    fn status(&self) -> JobStatus {
        match self {
            Self::Pre => JobStatus::RunningPreHook,
            Self::Post => JobStatus::RunningPostHook,
        }
    }

    fn failure_label(&self) -> &'static str {
        match self {
            Self::Pre => "pre-hook failed",
            Self::Post => "post-hook failed",
        }
    }
}

impl<'a, S: MetricSink> JobRunner<'a, S> {
    pub fn new(ctx: &'a RuntimeContext, config: &'a Config, reporter: &'a Reporter<S>) -> Self {
        Self {
            ctx,
            config,
            reporter,
        }
    }

    /// Run the named job through its full lifecycle
    ///
    /// Returns the terminal status, or `ResticmonError::Hook` when a hook
    /// aborted the run (the backup is never attempted after a failed
    /// pre-hook; a failed post-hook overrides the outcome with Failed).
    pub async fn run(&self, job_name: &str) -> Result<JobStatus> {
        let job = self.config.job(job_name)?;

        self.reporter.report_status(job_name, JobStatus::Starting).await;

        if let Some(pre) = job.hooks.as_ref().and_then(|h| h.pre.as_deref()) {
            self.run_hook_step(job_name, pre, HookKind::Pre).await?;
        }

        let status = self.run_restic(job_name, job).await?;

        if let Some(post) = job.hooks.as_ref().and_then(|h| h.post.as_deref()) {
            self.run_hook_step(job_name, post, HookKind::Post).await?;
        }

        self.reporter.report_status(job_name, status).await;
        Ok(status)
    }

    async fn run_hook_step(&self, job_name: &str, command: &str, kind: HookKind) -> Result<()> {
        self.reporter.report_status(job_name, kind.status()).await;

        let output = run_hook(command).await?;

        if !output.success() {
            let label = kind.failure_label();
            self.reporter
                .report(vec![Metric::new(job_key(job_name, "last_error"), label)])
                .await;
            self.reporter.report_status(job_name, JobStatus::Failed).await;
            return Err(ResticmonError::Hook(label.to_string()));
        }

        Ok(())
    }

    async fn run_restic(&self, job_name: &str, job: &JobDefinition) -> Result<JobStatus> {
        let args = build_restic_args(job_name, job);
        debug!("Spawning {} {:?}", self.ctx.restic_path.display(), args);

        let env = merge_env(&self.config.env, job.env.as_ref());

        let mut child = Command::new(&self.ctx.restic_path)
            .args(&args)
            .env_clear()
            .envs(&env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ResticmonError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "child stdout not piped",
            ))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            ResticmonError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "child stderr not piped",
            ))
        })?;

        self.reporter.report_status(job_name, JobStatus::Running).await;

        // Both streams are drained concurrently with the child; a blocked,
        // unread pipe would deadlock the backup.
        let stdout_task = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                match classify(&line) {
                    Ok(event) => {
                        let batch = project(job_name, &event, epoch_now());
                        if !batch.is_empty() {
                            self.reporter.report(batch).await;
                        }
                    }
                    Err(e) => warn!("Skipping unparseable restic output: {}", e),
                }
            }
            std::io::Result::Ok(())
        };

        let stderr_task = async {
            let mut lines = BufReader::new(stderr).lines();
            let mut collected = Vec::new();
            while let Some(line) = lines.next_line().await? {
                collected.push(line);
            }
            std::io::Result::Ok(collected.join("\n"))
        };

        let (stdout_result, stderr_result) = tokio::join!(stdout_task, stderr_task);
        stdout_result?;
        let stderr_text = stderr_result?;

        self.reporter
            .report(vec![Metric::new(
                job_key(job_name, "last_error"),
                stderr_text.clone(),
            )])
            .await;

        let exit = child.wait().await?;
        debug!("restic return code: {:?}", exit.code());

        Ok(JobStatus::from_exit(exit.code(), stderr_text.is_empty()))
    }
}

/// Build the restic argument vector for one job
pub fn build_restic_args(job_name: &str, job: &JobDefinition) -> Vec<String> {
    let mut args = vec![
        "--json".to_string(),
        "--tag".to_string(),
        job_name.to_string(),
    ];

    if let Some(excludes) = &job.exclude {
        for pattern in excludes {
            args.push("--exclude".to_string());
            args.push(pattern.clone());
        }
    }

    args.push("backup".to_string());
    args.extend(job.source.iter().cloned());

    args
}

/// Build the child environment from scratch
///
/// Global overlay first, then the job overlay, then HOME from the parent
/// process. The overlays must not be able to redirect HOME.
pub fn merge_env(
    global: &BTreeMap<String, String>,
    job: Option<&BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    let mut env = global.clone();

    if let Some(overlay) = job {
        for (key, value) in overlay {
            env.insert(key.clone(), value.clone());
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        env.insert("HOME".to_string(), home);
    }

    env
}
