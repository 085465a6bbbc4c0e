//! Hook script execution
//!
//! Hooks are one shell command each, run synchronously via `sh -c` with
//! output captured. The run does not proceed until the hook exits; hook
//! internals are entirely the operator's business.

use tokio::process::Command;
use tracing::debug;

use resticmon_core::{ResticmonError, Result};

/// Captured result of one hook command
#[derive(Debug, Clone)]
pub struct HookOutput {
    /// Exit code; `None` when the hook died to a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl HookOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run one hook command to completion, capturing its output
pub async fn run_hook(command: &str) -> Result<HookOutput> {
    debug!("Calling hook script: {}", command);

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .await
        .map_err(|e| ResticmonError::Hook(format!("failed to execute hook: {}", e)))?;

    Ok(HookOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}
