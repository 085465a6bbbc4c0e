//! Trapper-protocol sender
//!
//! One TCP connection per batch, matching the trapper protocol's
//! request/response-then-close exchange.

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use resticmon_core::{Metric, ResticmonError, Result, ZabbixConfig};

use crate::protocol::{frame, parse_header, SenderRequest, SenderResponse, HEADER_LEN};
use crate::MetricSink;

/// Sends metric batches to a Zabbix server or proxy
#[derive(Debug, Clone)]
pub struct ZabbixSender {
    server: String,
    port: u16,
}

impl ZabbixSender {
    pub fn new(config: &ZabbixConfig) -> Self {
        Self {
            server: config.server.clone(),
            port: config.port,
        }
    }

    async fn exchange(&self, body: &[u8]) -> Result<SenderResponse> {
        let mut stream = TcpStream::connect((self.server.as_str(), self.port))
            .await
            .map_err(|e| {
                ResticmonError::Sink(format!(
                    "connect to {}:{} failed: {}",
                    self.server, self.port, e
                ))
            })?;

        stream
            .write_all(&frame(body))
            .await
            .map_err(|e| ResticmonError::Sink(format!("write failed: {}", e)))?;

        let mut header = [0u8; HEADER_LEN];
        stream
            .read_exact(&mut header)
            .await
            .map_err(|e| ResticmonError::Sink(format!("read header failed: {}", e)))?;

        let body_len = parse_header(&header)?;
        let mut body = vec![0u8; body_len];
        stream
            .read_exact(&mut body)
            .await
            .map_err(|e| ResticmonError::Sink(format!("read body failed: {}", e)))?;

        serde_json::from_slice(&body)
            .map_err(|e| ResticmonError::Sink(format!("malformed response: {}", e)))
    }
}

#[async_trait]
impl MetricSink for ZabbixSender {
    async fn send(&self, host: &str, metrics: &[Metric]) -> Result<()> {
        let request = SenderRequest::new(host, metrics, Utc::now().timestamp());
        let body = serde_json::to_vec(&request)?;

        let response = self.exchange(&body).await?;

        if !response.is_success() {
            return Err(ResticmonError::Sink(format!(
                "server rejected batch: {}",
                response.info.as_deref().unwrap_or("no info")
            )));
        }

        debug!(
            "Sent {} metrics: {}",
            metrics.len(),
            response.info.as_deref().unwrap_or("")
        );
        Ok(())
    }
}
