//! Immutable runtime context
//!
//! Everything the runner needs that would otherwise live in process-global
//! state: the telemetry host dimension and the restic binary path. Built
//! once at startup from the config and the OS, then passed by reference.

use std::path::PathBuf;

use crate::Config;

/// Per-process runtime context
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Host dimension on every emitted metric; the machine FQDN unless
    /// overridden in the config
    pub hostname_fqdn: String,

    /// Path to the restic binary
    pub restic_path: PathBuf,
}

impl RuntimeContext {
    /// Build the context from config plus the local host identity
    pub fn from_config(config: &Config) -> Self {
        let override_fqdn = config
            .overrides
            .as_ref()
            .and_then(|o| o.hostname_fqdn.clone());

        let hostname_fqdn = override_fqdn.unwrap_or_else(Self::derive_fqdn);

        Self {
            hostname_fqdn,
            restic_path: config.restic_path.clone(),
        }
    }

    fn derive_fqdn() -> String {
        hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "localhost".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let config = Config::parse(
            r#"
backups: {}
overrides:
  hostname_fqdn: backup01.example.org
"#,
        )
        .unwrap();

        let ctx = RuntimeContext::from_config(&config);
        assert_eq!(ctx.hostname_fqdn, "backup01.example.org");
    }

    #[test]
    fn test_derived_fqdn_nonempty() {
        let config = Config::parse("backups: {}").unwrap();
        let ctx = RuntimeContext::from_config(&config);
        assert!(!ctx.hostname_fqdn.is_empty());
    }
}
