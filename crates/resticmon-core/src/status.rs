//! Job status vocabulary and terminal outcome derivation

/// Status values a job reports over its lifetime
///
/// Display renders the exact strings the Zabbix items expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Starting,
    RunningPreHook,
    Running,
    RunningPostHook,
    Success,
    Warning,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting"),
            Self::RunningPreHook => write!(f, "Running pre-hook"),
            Self::Running => write!(f, "Running"),
            Self::RunningPostHook => write!(f, "Running post-hook"),
            Self::Success => write!(f, "Success"),
            Self::Warning => write!(f, "Warning"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

impl JobStatus {
    /// Derive the terminal status from the restic exit code and whether any
    /// stderr output was captured.
    ///
    /// Restic's exit convention: 0 clean, 1 fatal, 3 partial (some source
    /// files could not be read). A clean exit with stderr chatter is
    /// downgraded to Warning. Any other code, including death by signal
    /// (`exit_code == None`), is Failed.
    pub fn from_exit(exit_code: Option<i32>, stderr_empty: bool) -> Self {
        match exit_code {
            Some(0) if stderr_empty => Self::Success,
            Some(0) => Self::Warning,
            Some(3) => Self::Warning,
            _ => Self::Failed,
        }
    }

    /// True for Success/Warning/Failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Warning | Self::Failed)
    }
}
