//! MetricRecord - canonical representation of one metric reading
//!
//! One spool line yields a template record carrying the host/service-level
//! metadata; the parser clones it once per perfdata token, and the clones
//! differ only in `label` / `value` / `uom`.

use tracing::trace;

/// Kind of check result a record originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataKind {
    /// Host-level perfdata (e.g. check_icmp rta/pl)
    #[default]
    HostPerfData,
    /// Service-level perfdata
    ServicePerfData,
}

/// One (label, value, timestamp) observation plus provenance.
///
/// `value` keeps the exact numeric substring from the perfdata token (the
/// unit-of-measure suffix stripped into `uom`) so that wire output preserves
/// the source formatting; sinks that need a number use [`numeric_value`].
///
/// [`numeric_value`]: MetricRecord::numeric_value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricRecord {
    /// Metric short name extracted from perfdata (e.g. "rta")
    pub label: String,
    /// Numeric value text, unit-of-measure suffix stripped
    pub value: String,
    /// Unit-of-measure annotation; not forwarded to most backends
    pub uom: String,
    /// Host or service perfdata
    pub kind: DataKind,
    /// Epoch seconds, taken verbatim from the source file; `None` until a
    /// parsable TIMET field is assigned
    pub timestamp: Option<i64>,
    /// Identity of the monitored host
    pub host_name: String,
    /// Empty for host-level metrics
    pub service_description: String,
    /// Original space-delimited perfdata blob (diagnostic use only)
    pub raw_perf_data: String,
    /// Check command passthrough (diagnostic sink only)
    pub check_command: String,
    pub host_state: String,
    pub host_state_type: String,
    pub service_state: String,
    pub service_state_type: String,
    /// Configured namespace prefix used when building backend paths
    pub prefix: String,
    /// Configured namespace postfix used when building backend paths
    pub postfix: String,
    /// Statsd metric type selector (gauge/counter/time/set)
    pub metric_type: String,
    /// True only when the record passed [`validate`](MetricRecord::validate)
    pub valid: bool,
}

impl MetricRecord {
    /// Create an empty template record
    pub fn new() -> Self {
        Self {
            metric_type: "gauge".to_string(),
            ..Self::default()
        }
    }

    /// Assign a spool field by its `NAME::VALUE` name.
    ///
    /// This is the explicit field lookup table: every recognized spool field
    /// maps to exactly one record field, unknown names are ignored with a
    /// trace log. Whitespace-stripping and sentinel handling are the
    /// parser's job; this method only assigns.
    pub fn set_field(&mut self, name: &str, value: &str) {
        match name {
            "DATATYPE" => match value {
                "HOSTPERFDATA" => self.kind = DataKind::HostPerfData,
                "SERVICEPERFDATA" => self.kind = DataKind::ServicePerfData,
                other => trace!(datatype = other, "unknown DATATYPE value"),
            },
            "TIMET" => self.timestamp = value.parse().ok(),
            "HOSTNAME" => self.host_name = value.to_string(),
            "SERVICEDESC" => self.service_description = value.to_string(),
            "HOSTPERFDATA" | "SERVICEPERFDATA" => self.raw_perf_data = value.to_string(),
            "HOSTCHECKCOMMAND" | "SERVICECHECKCOMMAND" => self.check_command = value.to_string(),
            "HOSTSTATE" => self.host_state = value.to_string(),
            "HOSTSTATETYPE" => self.host_state_type = value.to_string(),
            "SERVICESTATE" => self.service_state = value.to_string(),
            "SERVICESTATETYPE" => self.service_state_type = value.to_string(),
            "GRAPHITEPREFIX" => self.prefix = value.to_string(),
            "GRAPHITEPOSTFIX" => self.postfix = value.to_string(),
            "METRICTYPE" => self.metric_type = value.to_string(),
            other => trace!(field = other, "ignoring unknown spool field"),
        }
    }

    /// Compute the `valid` flag: timestamp parsed, raw perfdata and hostname
    /// non-empty. When `require_service_desc` is set, service-level records
    /// additionally need a non-empty service description.
    pub fn validate(&mut self, require_service_desc: bool) {
        self.valid = self.timestamp.is_some()
            && !self.raw_perf_data.is_empty()
            && !self.host_name.is_empty();
        if require_service_desc && self.kind == DataKind::ServicePerfData {
            self.valid = self.valid && !self.service_description.is_empty();
        }
    }

    /// Epoch seconds; 0 for records that never saw a TIMET field. Valid
    /// records always carry a real timestamp.
    pub fn epoch_secs(&self) -> i64 {
        self.timestamp.unwrap_or(0)
    }

    /// The value as a number, if the stored text parses
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.parse().ok()
    }
}
