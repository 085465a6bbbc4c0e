//! resticmon CLI - restic backup runs with Zabbix telemetry
//!
//! Usage:
//!   resticmon backup <job>      Run one configured backup job
//!   resticmon publish           Publish job discovery to the Zabbix server
//!
//! The process exit code reflects invocation problems only (bad usage,
//! missing config, failed hooks); the backup outcome itself travels to the
//! monitoring backend as a status metric.

use anyhow::Result;
use clap::{Parser, Subcommand};
use resticmon_core::{Config, RuntimeContext};
use resticmon_runner::{publish_discovery, JobRunner};
use resticmon_zabbix::{Reporter, ZabbixSender};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "resticmon")]
#[command(author, version, about = "Restic backup runs with Zabbix telemetry")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to the config file
    #[arg(long, value_name = "FILE", default_value = "config.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backup job
    Backup {
        /// Job name, as configured under `backups`
        job: String,
    },

    /// Publish the configured job set to the Zabbix server
    Publish,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let ctx = RuntimeContext::from_config(&config);
    let sender = ZabbixSender::new(&config.zabbix);
    let reporter = Reporter::new(sender, ctx.hostname_fqdn.clone());

    match cli.command {
        Commands::Backup { job } => {
            let runner = JobRunner::new(&ctx, &config, &reporter);
            match runner.run(&job).await {
                Ok(status) => {
                    info!("Backup job '{}' finished: {}", job, status);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!("{}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Publish => {
            publish_discovery(&config, &reporter).await;
            Ok(ExitCode::SUCCESS)
        }
    }
}
