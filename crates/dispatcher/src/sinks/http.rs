//! HttpSink - HTTPS gauge API with deduplicating aggregation
//!
//! The target API is rate-limited on timestamp granularity and charges per
//! unique series per window, so a flush first collapses records into a map
//! keyed by `name\tsource`: last value wins, and the measure time is floored
//! to the configured interval and fixed at first insertion. The map lives
//! only for the duration of one `send` call; one spool file's records never
//! contaminate another's aggregation.

use std::collections::HashMap;
use std::time::Duration;

use contracts::{MetricRecord, MetricSink, PathField, RelayConfig, RelayError};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::path::build_path;
use crate::sinks::parse_param;

const DEFAULT_API_URL: &str = "https://metrics-api.librato.com/v1/metrics";
const DEFAULT_FLOOR_SECS: i64 = 15;
const DEFAULT_MAX_PAYLOAD: usize = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_NAMEVALS: &str = "prefix,servicedesc,postfix,label";
const DEFAULT_SOURCEVALS: &str = "hostname";

/// Options for the HTTP gauge sink
#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    pub api_url: String,
    pub email: String,
    pub token: String,
    /// Fields joined into the gauge name
    pub namevals: Vec<PathField>,
    /// Fields joined into the gauge source dimension
    pub sourcevals: Vec<PathField>,
    /// Measure-time quantization interval; 0 disables flooring
    pub floor_secs: i64,
    /// Gauges per POST payload
    pub max_payload: usize,
    /// Allow-list over `name\tsource` keys; empty allows everything
    pub whitelist: Vec<Regex>,
    pub timeout: Duration,
}

/// One entry of the outgoing `{"gauges": [...]}` payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct Gauge {
    pub name: String,
    pub source: String,
    pub measure_time: i64,
    pub value: f64,
}

/// Sink POSTing deduplicated gauges to an HTTP time-series API
pub struct HttpSink {
    name: String,
    config: HttpSinkConfig,
    client: reqwest::Client,
}

impl HttpSink {
    pub fn new(name: impl Into<String>, config: HttpSinkConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("perfcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::config_parse(format!("http client: {e}")))?;
        Ok(Self {
            name: name.into(),
            config,
            client,
        })
    }

    /// Create from a sink's flat params map.
    ///
    /// `email` and `token` are required; the whitelist is a JSON array of
    /// regex patterns, compiled once here.
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        _relay: &RelayConfig,
    ) -> Result<Self, RelayError> {
        let email = params
            .get("email")
            .cloned()
            .ok_or_else(|| RelayError::config_validation("email", "required for the http sink"))?;
        let token = params
            .get("token")
            .cloned()
            .ok_or_else(|| RelayError::config_validation("token", "required for the http sink"))?;

        let namevals = PathField::parse_list(
            params.get("namevals").map(String::as_str).unwrap_or(DEFAULT_NAMEVALS),
        )?;
        let sourcevals = PathField::parse_list(
            params.get("sourcevals").map(String::as_str).unwrap_or(DEFAULT_SOURCEVALS),
        )?;

        let whitelist = match params.get("whitelist") {
            None => Vec::new(),
            Some(raw) => {
                let patterns: Vec<String> = serde_json::from_str(raw).map_err(|e| {
                    RelayError::config_validation("whitelist", format!("not a JSON array: {e}"))
                })?;
                let mut compiled = Vec::with_capacity(patterns.len());
                for pattern in &patterns {
                    debug!(pattern = %pattern, "adding whitelist pattern");
                    compiled.push(Regex::new(pattern).map_err(|e| {
                        RelayError::config_validation("whitelist", e.to_string())
                    })?);
                }
                compiled
            }
        };

        let config = HttpSinkConfig {
            api_url: params
                .get("api_url")
                .cloned()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            email,
            token,
            namevals,
            sourcevals,
            floor_secs: parse_param(params, "floor_secs", DEFAULT_FLOOR_SECS)?,
            max_payload: parse_param(params, "max_payload", DEFAULT_MAX_PAYLOAD)?,
            whitelist,
            timeout: Duration::from_secs(parse_param(params, "timeout_secs", DEFAULT_TIMEOUT_SECS)?),
        };
        Self::new(name, config)
    }

    /// Collapse a batch into unique gauges, last value per series winning
    pub(crate) fn collect_gauges(&self, records: &[MetricRecord]) -> HashMap<String, Gauge> {
        let mut gauges = HashMap::new();
        for m in records {
            self.add_measure(&mut gauges, m);
        }
        gauges
    }

    fn add_measure(&self, gauges: &mut HashMap<String, Gauge>, m: &MetricRecord) {
        let Some(value) = m.numeric_value() else {
            warn!(sink = %self.name, label = %m.label, "value is not numeric, dropping");
            return;
        };
        let mut measure_time = m.epoch_secs();
        if self.config.floor_secs > 0 {
            measure_time = (measure_time / self.config.floor_secs) * self.config.floor_secs;
        }

        let gauge_name = build_path(&self.config.namevals, m);
        let source = build_path(&self.config.sourcevals, m);
        let key = format!("{gauge_name}\t{source}");

        if !self.in_whitelist(&key) {
            trace!(sink = %self.name, key = %key, "not whitelisted, dropping");
            return;
        }

        let entry = gauges.entry(key).or_insert(Gauge {
            name: gauge_name,
            source,
            measure_time,
            value,
        });
        // measure_time stays fixed at first insertion
        entry.value = value;
    }

    fn in_whitelist(&self, key: &str) -> bool {
        self.config.whitelist.is_empty()
            || self.config.whitelist.iter().any(|p| p.is_match(key))
    }

    async fn flush(&self, gauges: &[Gauge]) -> Result<(), RelayError> {
        for chunk in gauges.chunks(self.config.max_payload) {
            let response = self
                .client
                .post(&self.config.api_url)
                .basic_auth(&self.config.email, Some(&self.config.token))
                .json(&serde_json::json!({ "gauges": chunk }))
                .send()
                .await
                .map_err(|e| RelayError::sink_send(&self.name, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RelayError::sink_send(
                    &self.name,
                    format!("HTTP {status}: {body}"),
                ));
            }
        }
        Ok(())
    }
}

impl MetricSink for HttpSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, records: &[MetricRecord]) -> usize {
        if records.is_empty() {
            return 0;
        }
        let gauges: Vec<Gauge> = self.collect_gauges(records).into_values().collect();
        if gauges.is_empty() {
            // everything suppressed by the allow-list; that is by design,
            // not a delivery failure
            return records.len();
        }
        debug!(sink = %self.name, gauges = gauges.len(), records = records.len(), "flushing");
        match self.flush(&gauges).await {
            Ok(()) => records.len(),
            Err(e) => {
                warn!(sink = %self.name, error = %e, "flush failed");
                0
            }
        }
    }
}
