//! Dispatcher - fan-out of one spool file's records to all enabled sinks

use contracts::{Dispatch, MetricRecord, MetricSink, RelayConfig, RelayError, SinkConfig, SinkType};
use tracing::{info, warn};

use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sinks::{BinarySink, ConsoleSink, HttpSink, LineSink, StatsdSink};

/// One concrete sink behind a uniform `send` surface
pub enum SinkInstance {
    Line(LineSink),
    Binary(BinarySink),
    Statsd(StatsdSink),
    Http(HttpSink),
    Console(ConsoleSink),
}

impl MetricSink for SinkInstance {
    fn name(&self) -> &str {
        match self {
            Self::Line(s) => s.name(),
            Self::Binary(s) => s.name(),
            Self::Statsd(s) => s.name(),
            Self::Http(s) => s.name(),
            Self::Console(s) => s.name(),
        }
    }

    async fn send(&mut self, records: &[MetricRecord]) -> usize {
        match self {
            Self::Line(s) => s.send(records).await,
            Self::Binary(s) => s.send(records).await,
            Self::Statsd(s) => s.send(records).await,
            Self::Http(s) => s.send(records).await,
            Self::Console(s) => s.send(records).await,
        }
    }
}

/// Create a sink instance from one configuration entry
fn build_sink(config: &SinkConfig, relay: &RelayConfig) -> Result<SinkInstance, RelayError> {
    let name = config.name.clone();
    match config.sink_type {
        SinkType::Line => Ok(SinkInstance::Line(LineSink::from_params(
            name,
            &config.params,
            relay,
        )?)),
        SinkType::Binary => Ok(SinkInstance::Binary(BinarySink::from_params(
            name,
            &config.params,
            relay,
        )?)),
        SinkType::Statsd => Ok(SinkInstance::Statsd(StatsdSink::from_params(
            name,
            &config.params,
            relay,
        )?)),
        SinkType::Http => Ok(SinkInstance::Http(HttpSink::from_params(
            name,
            &config.params,
            relay,
        )?)),
        SinkType::Console => Ok(SinkInstance::Console(ConsoleSink::new(name))),
    }
}

struct SinkEntry {
    sink: SinkInstance,
    metrics: SinkMetrics,
}

/// Immutable, constructed-once set of enabled sinks
pub struct Dispatcher {
    entries: Vec<SinkEntry>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Dispatcher {
    /// Build every enabled sink from the resolved configuration.
    ///
    /// # Errors
    /// Sink option coercion failures are fatal, and so is an empty enabled
    /// set: a zero-sink relay has no useful work to do.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let mut entries = Vec::new();
        for sink_config in config.enabled_sinks() {
            let sink = build_sink(sink_config, config)?;
            info!(
                sink = %sink_config.name,
                sink_type = ?sink_config.sink_type,
                "sink initialized"
            );
            entries.push(SinkEntry {
                sink,
                metrics: SinkMetrics::new(),
            });
        }
        Self::with_sinks_inner(entries)
    }

    /// Create a dispatcher from already-built sinks (used by tests)
    pub fn with_sinks(sinks: Vec<SinkInstance>) -> Result<Self, RelayError> {
        Self::with_sinks_inner(
            sinks
                .into_iter()
                .map(|sink| SinkEntry {
                    sink,
                    metrics: SinkMetrics::new(),
                })
                .collect(),
        )
    }

    fn with_sinks_inner(entries: Vec<SinkEntry>) -> Result<Self, RelayError> {
        if entries.is_empty() {
            return Err(RelayError::NoSinksEnabled);
        }
        Ok(Self { entries })
    }

    /// Number of enabled sinks
    pub fn sink_count(&self) -> usize {
        self.entries.len()
    }

    /// Per-sink counter snapshots
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.entries
            .iter()
            .map(|e| (e.sink.name().to_string(), e.metrics.snapshot()))
            .collect()
    }
}

impl Dispatch for Dispatcher {
    /// Send the batch to every sink sequentially and sum the accept counts.
    /// A sink that accepts nothing is a failure for that sink only; the
    /// remaining sinks still see the batch.
    async fn dispatch(&mut self, records: &[MetricRecord]) -> usize {
        let mut accepted = 0;
        for entry in &mut self.entries {
            let count = entry.sink.send(records).await;
            if count == 0 && !records.is_empty() {
                entry.metrics.inc_failure_count();
                warn!(sink = %entry.sink.name(), "sink accepted nothing for this batch");
            } else {
                entry.metrics.inc_send_count();
                entry.metrics.add_records_accepted(count as u64);
            }
            accepted += count;
        }
        accepted
    }
}
