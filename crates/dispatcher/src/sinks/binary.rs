//! BinarySink - length-prefixed serialized batches over TCP
//!
//! Each chunk is a serialized `Vec<(path, (timestamp, value))>` batch behind
//! a big-endian u32 length header, the framing the batch receiver port
//! expects.

use std::collections::HashMap;

use bytes::{BufMut, BytesMut};
use contracts::{MetricRecord, MetricSink, PathField, RelayConfig, RelayError};
use tracing::{debug, error, warn};

use crate::path::{build_path, sanitize};
use crate::sinks::line::path_scheme;
use crate::sinks::tcp::{self, TcpSinkConfig};

/// Batch receiver port
const DEFAULT_PORT: u16 = 2004;

/// Sink speaking the binary batch time-series protocol
pub struct BinarySink {
    name: String,
    config: TcpSinkConfig,
    fields: Vec<PathField>,
}

impl BinarySink {
    /// Create a BinarySink; shares the path scheme and chunking model with
    /// [`LineSink`](crate::LineSink)
    pub fn new(name: impl Into<String>, config: TcpSinkConfig, use_service_desc: bool) -> Self {
        Self {
            name: name.into(),
            config,
            fields: path_scheme(use_service_desc),
        }
    }

    /// Create from a sink's flat params map
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        relay: &RelayConfig,
    ) -> Result<Self, RelayError> {
        let config = TcpSinkConfig::from_params(params, relay, DEFAULT_PORT)?;
        Ok(Self::new(name, config, relay.use_service_desc))
    }

    /// Encode records into framed wire payloads
    pub(crate) fn encode(&self, records: &[MetricRecord]) -> Result<Vec<Vec<u8>>, RelayError> {
        let mut payloads = Vec::new();
        for chunk in records.chunks(self.config.max_metrics) {
            let batch: Vec<(String, (i64, f64))> = chunk
                .iter()
                .filter_map(|m| m.numeric_value().map(|v| (self.path(m), (m.epoch_secs(), v))))
                .collect();
            let body = bincode::serialize(&batch)
                .map_err(|e| RelayError::sink_send(&self.name, e.to_string()))?;

            let mut framed = BytesMut::with_capacity(body.len() + 4);
            framed.put_u32(body.len() as u32); // network byte order
            framed.extend_from_slice(&body);
            payloads.push(framed.to_vec());
        }
        Ok(payloads)
    }

    fn path(&self, m: &MetricRecord) -> String {
        sanitize(&build_path(&self.fields, m), self.config.replacement)
    }
}

impl MetricSink for BinarySink {
    fn name(&self) -> &str {
        &self.name
    }

    /// Same server loop as the line sink: connect failure skips the server,
    /// send failure aborts the whole call.
    async fn send(&mut self, records: &[MetricRecord]) -> usize {
        if records.is_empty() {
            return 0;
        }
        let payloads = match self.encode(records) {
            Ok(payloads) => payloads,
            Err(e) => {
                error!(sink = %self.name, error = %e, "batch encode failed");
                return 0;
            }
        };
        let mut accepted = 0;

        for (host, port) in &self.config.servers {
            debug!(sink = %self.name, server = %format!("{host}:{port}"), "connecting");
            let mut stream = match tcp::connect(&self.name, host, *port, self.config.timeout).await
            {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(sink = %self.name, error = %e, "connect failed, skipping server");
                    continue;
                }
            };
            for payload in &payloads {
                if let Err(e) =
                    tcp::send_payload(&self.name, &mut stream, payload, self.config.timeout).await
                {
                    error!(sink = %self.name, error = %e, "send failed, aborting batch");
                    return 0;
                }
            }
            accepted += records.len();
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sink() -> BinarySink {
        BinarySink::new(
            "batch",
            TcpSinkConfig {
                servers: vec![],
                max_metrics: 2,
                replacement: '_',
                timeout: Duration::from_secs(1),
            },
            false,
        )
    }

    fn record(host: &str, label: &str, value: &str, timestamp: i64) -> MetricRecord {
        let mut m = MetricRecord::new();
        m.host_name = host.to_string();
        m.label = label.to_string();
        m.value = value.to_string();
        m.timestamp = Some(timestamp);
        m
    }

    #[test]
    fn test_encode_frames_round_trip() {
        let records = vec![
            record("db01", "rta", "1.066", 123),
            record("db01", "pl", "0", 123),
            record("db02", "rta", "4.2", 124),
        ];
        let payloads = sink().encode(&records).unwrap();
        assert_eq!(payloads.len(), 2, "chunked at max_metrics = 2");

        // each frame: u32 big-endian length, then the serialized batch
        let frame = &payloads[0];
        let len = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
        assert_eq!(len, frame.len() - 4);

        let batch: Vec<(String, (i64, f64))> = bincode::deserialize(&frame[4..]).unwrap();
        assert_eq!(
            batch,
            vec![
                ("db01.rta".to_string(), (123, 1.066)),
                ("db01.pl".to_string(), (123, 0.0)),
            ]
        );

        let tail: Vec<(String, (i64, f64))> = bincode::deserialize(&payloads[1][4..]).unwrap();
        assert_eq!(tail, vec![("db02.rta".to_string(), (124, 4.2))]);
    }
}
