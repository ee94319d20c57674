//! Configuration validation
//!
//! Validation rules:
//! - spool_directory non-empty
//! - sink names unique and non-empty
//! - replacement_character is not a path separator

use std::collections::HashSet;

use contracts::{RelayConfig, RelayError};
use validator::Validate;

/// Validate a RelayConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RelayConfig) -> Result<(), RelayError> {
    config
        .validate()
        .map_err(|e| RelayError::config_validation("config", e.to_string()))?;
    validate_replacement_character(config)?;
    validate_sink_names(config)?;
    Ok(())
}

/// A '.' replacement would let sanitized labels mint new path segments
fn validate_replacement_character(config: &RelayConfig) -> Result<(), RelayError> {
    if config.replacement_character == '.' {
        return Err(RelayError::config_validation(
            "replacement_character",
            "must not be the path separator '.'",
        ));
    }
    Ok(())
}

/// Sink names must be unique and non-empty
fn validate_sink_names(config: &RelayConfig) -> Result<(), RelayError> {
    let mut seen = HashSet::new();
    for sink in &config.sinks {
        if sink.name.is_empty() {
            return Err(RelayError::config_validation(
                "sinks[].name",
                "sink name must not be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(RelayError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}
