//! PathField - fixed, statically-checkable accessor table for namespace paths
//!
//! Backends build their dot-delimited metric identities from configurable
//! field-name lists. Instead of reflective attribute lookup, every allowed
//! name maps to one enum variant with an explicit accessor.

use std::str::FromStr;

use crate::{MetricRecord, RelayError};

/// One selectable record field in a backend naming scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathField {
    /// Configured namespace prefix
    Prefix,
    /// Monitored host identity
    Hostname,
    /// Service description (empty for host-level metrics)
    ServiceDesc,
    /// Configured namespace postfix
    Postfix,
    /// Metric short name
    Label,
    /// Unit-of-measure annotation
    Uom,
}

impl PathField {
    /// Current value of this field on `record`
    pub fn value_of<'a>(&self, record: &'a MetricRecord) -> &'a str {
        match self {
            Self::Prefix => &record.prefix,
            Self::Hostname => &record.host_name,
            Self::ServiceDesc => &record.service_description,
            Self::Postfix => &record.postfix,
            Self::Label => &record.label,
            Self::Uom => &record.uom,
        }
    }

    /// Parse a comma-separated field list from configuration
    pub fn parse_list(list: &str) -> Result<Vec<Self>, RelayError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::from_str)
            .collect()
    }
}

impl FromStr for PathField {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prefix" | "graphiteprefix" => Ok(Self::Prefix),
            "hostname" => Ok(Self::Hostname),
            "servicedesc" => Ok(Self::ServiceDesc),
            "postfix" | "graphitepostfix" => Ok(Self::Postfix),
            "label" => Ok(Self::Label),
            "uom" => Ok(Self::Uom),
            other => Err(RelayError::config_validation(
                "path field list",
                format!("unknown field name '{other}'"),
            )),
        }
    }
}
