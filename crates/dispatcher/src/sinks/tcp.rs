//! Shared TCP plumbing for the line and binary sinks
//!
//! Both speak to the same set of time-series servers and share the chunked
//! batch model; only the payload encoding differs. Every connect and send
//! carries an explicit timeout so an unresponsive backend cannot stall the
//! dispatch loop.

use std::collections::HashMap;
use std::time::Duration;

use contracts::{RelayConfig, RelayError};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{parse_param, parse_servers};

const DEFAULT_MAX_METRICS: usize = 200;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Options shared by the TCP batch sinks
#[derive(Debug, Clone)]
pub struct TcpSinkConfig {
    /// Target servers, `(host, port)`
    pub servers: Vec<(String, u16)>,
    /// Records per payload chunk
    pub max_metrics: usize,
    /// Replacement for protocol-invalid path characters
    pub replacement: char,
    /// Applied to connect and to every payload write
    pub timeout: Duration,
}

impl TcpSinkConfig {
    /// Build from a sink's flat params map
    pub fn from_params(
        params: &HashMap<String, String>,
        relay: &RelayConfig,
        default_port: u16,
    ) -> Result<Self, RelayError> {
        let servers = parse_servers(
            params.get("servers").map(String::as_str).unwrap_or(""),
            default_port,
        )?;
        let max_metrics = parse_param(params, "max_metrics", DEFAULT_MAX_METRICS)?;
        if max_metrics == 0 {
            return Err(RelayError::config_validation(
                "max_metrics",
                "must be at least 1",
            ));
        }
        let timeout_secs = parse_param(params, "timeout_secs", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            servers,
            max_metrics,
            replacement: relay.replacement_character,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Connect with a bounded timeout
pub(crate) async fn connect(
    sink: &str,
    host: &str,
    port: u16,
    limit: Duration,
) -> Result<TcpStream, RelayError> {
    let addr = format!("{host}:{port}");
    match timeout(limit, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(RelayError::sink_connection(sink, format!("{addr}: {e}"))),
        Err(_) => Err(RelayError::sink_connection(
            sink,
            format!("{addr}: connect timed out"),
        )),
    }
}

/// Write one payload with a bounded timeout
pub(crate) async fn send_payload(
    sink: &str,
    stream: &mut TcpStream,
    payload: &[u8],
    limit: Duration,
) -> Result<(), RelayError> {
    match timeout(limit, stream.write_all(payload)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(RelayError::sink_send(sink, e.to_string())),
        Err(_) => Err(RelayError::sink_send(sink, "send timed out".to_string())),
    }
}
