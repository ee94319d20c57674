//! LineSink - newline-delimited `path value timestamp` text over TCP

use std::collections::HashMap;

use contracts::{MetricRecord, MetricSink, PathField, RelayConfig, RelayError};
use tracing::{debug, error, warn};

use crate::path::{build_path, sanitize};
use crate::sinks::tcp::{self, TcpSinkConfig};

/// Plaintext receiver port
const DEFAULT_PORT: u16 = 2003;

/// Sink speaking the line-oriented time-series protocol
pub struct LineSink {
    name: String,
    config: TcpSinkConfig,
    fields: Vec<PathField>,
}

impl LineSink {
    /// Create a LineSink; the path scheme is
    /// `prefix.host(.servicedesc).postfix.label` depending on
    /// service-description mode
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

    /// Encode records into chunked wire payloads
    pub(crate) fn encode(&self, records: &[MetricRecord]) -> Vec<String> {
        records
            .chunks(self.config.max_metrics)
            .map(|chunk| {
                let mut payload = String::new();
                for m in chunk {
                    payload.push_str(&self.format_line(m));
                }
                payload
            })
            .collect()
    }

    fn format_line(&self, m: &MetricRecord) -> String {
        format!("{} {} {}\n", self.path(m), m.value, m.epoch_secs())
    }

    fn path(&self, m: &MetricRecord) -> String {
        sanitize(&build_path(&self.fields, m), self.config.replacement)
    }
}

/// Field order for the TCP sinks' namespace path
pub(crate) fn path_scheme(use_service_desc: bool) -> Vec<PathField> {
    if use_service_desc {
        vec![
            PathField::Prefix,
            PathField::Hostname,
            PathField::ServiceDesc,
            PathField::Postfix,
            PathField::Label,
        ]
    } else {
        vec![
            PathField::Prefix,
            PathField::Hostname,
            PathField::Postfix,
            PathField::Label,
        ]
    }
}

impl MetricSink for LineSink {
    fn name(&self) -> &str {
        &self.name
    }

    /// Deliver the batch to every configured server.
    ///
    /// A server that refuses the connection is skipped; a failure while
    /// sending aborts the remaining chunks and fails the whole call.
    async fn send(&mut self, records: &[MetricRecord]) -> usize {
        if records.is_empty() {
            return 0;
        }
        let payloads = self.encode(records);
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
                    tcp::send_payload(&self.name, &mut stream, payload.as_bytes(), self.config.timeout)
                        .await
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

    fn sink(max_metrics: usize) -> LineSink {
        LineSink::new(
            "graphite",
            TcpSinkConfig {
                servers: vec![("127.0.0.1".to_string(), DEFAULT_PORT)],
                max_metrics,
                replacement: '_',
                timeout: Duration::from_secs(1),
            },
            false,
        )
    }

    fn record(label: &str, value: &str, timestamp: i64) -> MetricRecord {
        let mut m = MetricRecord::new();
        m.label = label.to_string();
        m.value = value.to_string();
        m.timestamp = Some(timestamp);
        m
    }

    #[test]
    fn test_encode_strips_units_and_fixes_labels() {
        // labels as the parser leaves them: spaces and dots already
        // replaced, colons and backslashes still present
        let records = vec![
            record("'_var'", "9", 123),
            record("'_foo_bar'", "2", 123),
            record("'_bar_baz'", "4", 123),
            record(r"'D:\_Label_Data__Serial_Number_8c4da61a'", "209524", 123),
        ];
        let payloads = sink(200).encode(&records);
        assert_eq!(payloads.len(), 1);
        let lines: Vec<&str> = payloads[0].lines().collect();
        assert_eq!(
            lines,
            vec![
                "'_var' 9 123",
                "'_foo_bar' 2 123",
                "'_bar_baz' 4 123",
                "'D___Label_Data__Serial_Number_8c4da61a' 209524 123",
            ]
        );
    }

    #[test]
    fn test_encode_full_path() {
        let mut m = record("rta", "1.066", 1434331570);
        m.prefix = "mon.dc1".to_string();
        m.host_name = "db01".to_string();
        let payloads = sink(200).encode(&[m]);
        assert_eq!(payloads[0], "mon.dc1.db01.rta 1.066 1434331570\n");
    }

    #[test]
    fn test_encode_chunks_by_max_metrics() {
        let records: Vec<_> = (0..5).map(|i| record("x", "1", i)).collect();
        let payloads = sink(2).encode(&records);
        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[0].lines().count(), 2);
        assert_eq!(payloads[2].lines().count(), 1);
    }

    #[test]
    fn test_service_desc_scheme() {
        let mut m = record("connection_time", "0.0213", 123);
        m.host_name = "db01".to_string();
        m.service_description = "MySQL_Connection_Time".to_string();
        let sink = LineSink::new(
            "graphite",
            TcpSinkConfig {
                servers: vec![],
                max_metrics: 200,
                replacement: '_',
                timeout: Duration::from_secs(1),
            },
            true,
        );
        assert_eq!(
            sink.encode(&[m])[0],
            "db01.MySQL_Connection_Time.connection_time 0.0213 123\n"
        );
    }

    #[tokio::test]
    async fn test_send_unreachable_server_returns_zero() {
        // connect refused on a closed port: the server is skipped and no
        // records are accepted
        let mut sink = LineSink::new(
            "graphite",
            TcpSinkConfig {
                servers: vec![("127.0.0.1".to_string(), 1)],
                max_metrics: 200,
                replacement: '_',
                timeout: Duration::from_millis(200),
            },
            false,
        );
        assert_eq!(sink.send(&[record("x", "1", 1)]).await, 0);
    }
}
