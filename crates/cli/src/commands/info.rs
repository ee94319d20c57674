//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::RelayConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    spool_directory: String,
    interval_secs: u64,
    replacement_character: char,
    use_service_desc: bool,
    test_mode: bool,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    enabled: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Reading configuration");

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_info(&config);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?
        );
    } else {
        print_info(&info);
    }

    Ok(())
}

fn build_info(config: &RelayConfig) -> ConfigInfo {
    ConfigInfo {
        spool_directory: config.spool_directory.clone(),
        interval_secs: config.interval_secs,
        replacement_character: config.replacement_character,
        use_service_desc: config.use_service_desc,
        test_mode: config.test_mode,
        sinks: config
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type).to_lowercase(),
                enabled: s.enabled,
            })
            .collect(),
    }
}

fn print_info(info: &ConfigInfo) {
    println!("Spool directory: {}", info.spool_directory);
    println!("Scan interval: {}s", info.interval_secs);
    println!("Replacement character: '{}'", info.replacement_character);
    println!("Service descriptions in paths: {}", info.use_service_desc);
    println!("Test mode: {}", info.test_mode);
    println!("Sinks:");
    for sink in &info.sinks {
        let state = if sink.enabled { "enabled" } else { "disabled" };
        println!("  - {} ({}, {})", sink.name, sink.sink_type, state);
    }
    if info.sinks.is_empty() {
        println!("  (none configured)");
    }
}
