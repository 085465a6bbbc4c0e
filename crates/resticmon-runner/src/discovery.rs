//! Low-level-discovery publication
//!
//! Registers the configured job names with the Zabbix backend so per-job
//! items can be auto-generated. No backup runs; this is pure metadata.

use serde_json::json;
use tracing::info;

use resticmon_core::{Config, Metric, APP_VERSION, KEY_PROFILES, KEY_VERSION};
use resticmon_zabbix::{MetricSink, Reporter};

/// Publish the discovery payload and the bridge version
pub async fn publish_discovery<S: MetricSink>(config: &Config, reporter: &Reporter<S>) {
    let names = config.job_names();

    let discovery = json!({
        "data": names
            .iter()
            .map(|name| json!({ "{#PROFILE}": name }))
            .collect::<Vec<_>>(),
    });

    info!("Sending discovery: {:?}", names);

    reporter
        .report(vec![Metric::new(KEY_PROFILES, discovery.to_string())])
        .await;
    reporter
        .report(vec![Metric::new(KEY_VERSION, APP_VERSION)])
        .await;
}
