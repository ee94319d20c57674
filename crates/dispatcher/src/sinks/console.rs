//! ConsoleSink - plain stdout echo of every record field
//!
//! The diagnostic sink: no transport, never fails. Useful for verifying what
//! the parser actually extracted from a spool file.

use contracts::{DataKind, MetricRecord, MetricSink};

/// Sink echoing records to stdout
pub struct ConsoleSink {
    name: String,
}

impl ConsoleSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn echo(m: &MetricRecord) {
        let kind = match m.kind {
            DataKind::HostPerfData => "HOSTPERFDATA",
            DataKind::ServicePerfData => "SERVICEPERFDATA",
        };
        println!("LABEL: {}", m.label);
        println!("VALUE: {}", m.value);
        println!("UOM: {}", m.uom);
        println!("DATATYPE: {kind}");
        println!("TIMET: {}", m.epoch_secs());
        println!("HOSTNAME: {}", m.host_name);
        println!("SERVICEDESC: {}", m.service_description);
        println!("PERFDATA: {}", m.raw_perf_data);
        println!("CHECKCOMMAND: {}", m.check_command);
        println!("HOSTSTATE: {}", m.host_state);
        println!("HOSTSTATETYPE: {}", m.host_state_type);
        println!("SERVICESTATE: {}", m.service_state);
        println!("SERVICESTATETYPE: {}", m.service_state_type);
        println!("METRICTYPE: {}", m.metric_type);
        println!("PREFIX: {}", m.prefix);
        println!("POSTFIX: {}", m.postfix);
        println!("-------");
    }
}

impl MetricSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, records: &[MetricRecord]) -> usize {
        for m in records {
            Self::echo(m);
        }
        records.len()
    }
}
