//! `run` command implementation.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use dispatcher::Dispatcher;
use ingestion::{PerfdataParser, SpoolWalker};
use tracing::info;

use crate::cli::RunArgs;
use crate::stats::RunStats;

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref spool) = args.spool {
        info!(spool = %spool, "Overriding spool directory from CLI");
        config.spool_directory = spool.clone();
    }
    if let Some(interval) = args.interval {
        info!(interval, "Overriding scan interval from CLI");
        config.interval_secs = interval;
    }
    if args.test_mode {
        config.test_mode = true;
    }

    info!(
        spool = %config.spool_directory,
        interval = config.interval_secs,
        sinks = config.enabled_sinks().count(),
        test_mode = config.test_mode,
        "Configuration loaded"
    );

    // Fatal when zero sinks are enabled
    let mut dispatcher = Dispatcher::from_config(&config)?;
    let parser = PerfdataParser::new(config.replacement_character, config.use_service_desc);
    let walker = SpoolWalker::new(parser, config.test_mode);
    let spool_dir = PathBuf::from(&config.spool_directory);

    let started = Instant::now();
    let mut stats = RunStats::default();

    loop {
        let cycle = walker.process_directory(&spool_dir, &mut dispatcher).await?;
        stats.absorb(&cycle);

        if args.once {
            break;
        }

        // Nothing is buffered across iterations, so a termination signal
        // during the sleep ends the loop without losing in-flight state.
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(config.interval_secs)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received, shutting down");
                break;
            }
        }
    }

    stats.duration = started.elapsed();
    stats.print_summary(&dispatcher.metrics());
    Ok(())
}
