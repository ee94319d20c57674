//! StatsdSink - fire-and-forget UDP datagrams
//!
//! One datagram per record per server; losses are counted but never abort
//! the remaining sends.

use std::collections::HashMap;

use contracts::{MetricRecord, MetricSink, PathField, RelayConfig, RelayError};
use tokio::net::UdpSocket;
use tracing::{debug, error, warn};

use crate::path::build_path;
use crate::sinks::parse_servers;

const DEFAULT_PORT: u16 = 8125;

const FIELDS: &[PathField] = &[
    PathField::Prefix,
    PathField::Hostname,
    PathField::Postfix,
    PathField::Label,
];

/// Sink speaking the statsd datagram protocol
pub struct StatsdSink {
    name: String,
    servers: Vec<(String, u16)>,
}

impl StatsdSink {
    pub fn new(name: impl Into<String>, servers: Vec<(String, u16)>) -> Self {
        Self {
            name: name.into(),
            servers,
        }
    }

    /// Create from a sink's flat params map
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        _relay: &RelayConfig,
    ) -> Result<Self, RelayError> {
        let servers = parse_servers(
            params.get("servers").map(String::as_str).unwrap_or(""),
            DEFAULT_PORT,
        )?;
        Ok(Self::new(name, servers))
    }

    /// `path:value|type` — the wire format the aggregation daemon expects
    pub(crate) fn datagram(m: &MetricRecord) -> String {
        format!(
            "{}:{}|{}",
            build_path(FIELDS, m),
            m.value,
            type_suffix(&m.metric_type)
        )
    }
}

/// Map the record's metric type onto the protocol suffix, defaulting to
/// gauge for anything unrecognized
fn type_suffix(metric_type: &str) -> &'static str {
    if metric_type.contains("counter") {
        "c"
    } else if metric_type.contains("time") {
        "ms"
    } else if metric_type.contains("set") {
        "s"
    } else {
        "g"
    }
}

impl MetricSink for StatsdSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, records: &[MetricRecord]) -> usize {
        let socket = match UdpSocket::bind("0.0.0.0:0").await {
            Ok(socket) => socket,
            Err(e) => {
                error!(sink = %self.name, error = %e, "could not bind datagram socket");
                return 0;
            }
        };

        let mut sent = 0;
        for (host, port) in &self.servers {
            debug!(sink = %self.name, server = %format!("{host}:{port}"), "sending datagrams");
            for m in records {
                let payload = Self::datagram(m);
                match socket.send_to(payload.as_bytes(), (host.as_str(), *port)).await {
                    Ok(_) => sent += 1,
                    Err(e) => {
                        warn!(sink = %self.name, error = %e, "datagram send failed");
                    }
                }
            }
        }
        sent
    }
}
