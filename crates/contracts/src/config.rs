//! Resolved configuration types
//!
//! `RelayConfig` is the read-only option set handed to the core by the
//! config loader. Sink-specific options stay a flat string map; each sink
//! coerces its own integers at construction and fails fast on garbage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level relay configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelayConfig {
    /// Directory the monitoring daemon spools perfdata files into
    #[validate(length(min = 1))]
    pub spool_directory: String,

    /// Seconds to sleep between spool directory scans
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Replacement for characters that would produce invalid namespace
    /// segments
    #[serde(default = "default_replacement_character")]
    pub replacement_character: char,

    /// Include the service description in TCP sink paths and require it on
    /// service-level records
    #[serde(default)]
    pub use_service_desc: bool,

    /// Process spool files without deleting them (sink output still happens)
    #[serde(default)]
    pub test_mode: bool,

    /// Configured backend sinks
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

fn default_interval_secs() -> u64 {
    15
}

fn default_replacement_character() -> char {
    '_'
}

impl RelayConfig {
    /// Sinks whose `enabled` flag is set
    pub fn enabled_sinks(&self) -> impl Iterator<Item = &SinkConfig> {
        self.sinks.iter().filter(|s| s.enabled)
    }
}

/// One backend sink entry
///
/// A misspelled `sink_type` fails deserialization, so typo'd backends are a
/// startup configuration error rather than a silently-disabled sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name (unique, used in logs and counters)
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Toggle without removing the entry
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Type-specific options, all values strings
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

/// Sink type registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Newline-delimited `path value timestamp` text over TCP
    Line,
    /// Length-prefixed binary batches over TCP
    Binary,
    /// Statsd-style UDP datagrams
    Statsd,
    /// HTTP gauge API with deduplicating aggregation
    Http,
    /// Plain stdout echo of every record field
    Console,
}
