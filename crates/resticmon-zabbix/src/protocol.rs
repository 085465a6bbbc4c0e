//! Zabbix trapper protocol framing and bodies
//!
//! Wire format, both directions:
//! - magic: [u8; 4]     = "ZBXD"
//! - flags: u8          = 0x01 (plain, uncompressed)
//! - length: u64        = body length, little-endian
//! - body               = JSON
//!
//! The request body is a `sender data` envelope carrying (host, key, value,
//! clock) items; the response body carries a `response` verdict and a
//! processed/failed summary in `info`.

use serde::{Deserialize, Serialize};

use resticmon_core::{Metric, ResticmonError, Result};

const MAGIC: [u8; 4] = *b"ZBXD";
const FLAGS_PLAIN: u8 = 0x01;

/// Size of the fixed header preceding every body
pub const HEADER_LEN: usize = 13;

/// Frame a JSON body for the wire
pub fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&MAGIC);
    out.push(FLAGS_PLAIN);
    out.extend_from_slice(&(body.len() as u64).to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Parse a received header, returning the body length
pub fn parse_header(header: &[u8; HEADER_LEN]) -> Result<usize> {
    if header[..4] != MAGIC {
        return Err(ResticmonError::Sink(
            "response does not start with ZBXD magic".to_string(),
        ));
    }
    if header[4] != FLAGS_PLAIN {
        return Err(ResticmonError::Sink(format!(
            "unsupported protocol flags: {:#04x}",
            header[4]
        )));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[5..13]);
    Ok(u64::from_le_bytes(len_bytes) as usize)
}

/// One item of a `sender data` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderItem {
    pub host: String,
    pub key: String,
    pub value: String,
    pub clock: i64,
}

/// A `sender data` request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderRequest {
    pub request: String,
    pub data: Vec<SenderItem>,
    pub clock: i64,
}

impl SenderRequest {
    /// Build a request for one batch, stamping every item with `clock`
    pub fn new(host: &str, metrics: &[Metric], clock: i64) -> Self {
        Self {
            request: "sender data".to_string(),
            data: metrics
                .iter()
                .map(|m| SenderItem {
                    host: host.to_string(),
                    key: m.key.clone(),
                    value: m.value.to_string(),
                    clock,
                })
                .collect(),
            clock,
        }
    }
}

/// The server's verdict on a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderResponse {
    pub response: String,

    #[serde(default)]
    pub info: Option<String>,
}

impl SenderResponse {
    pub fn is_success(&self) -> bool {
        self.response == "success"
    }
}
