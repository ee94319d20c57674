//! Run statistics accumulated across scan cycles.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use ingestion::WalkStats;

/// Statistics from one relay run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    /// Completed scan cycles
    pub cycles: u64,
    /// Spool files examined
    pub files_processed: u64,
    /// Records produced by the parser
    pub records_parsed: u64,
    /// Summed accept counts across sinks
    pub records_dispatched: u64,
    /// Total duration of the run
    pub duration: Duration,
}

impl RunStats {
    /// Fold one scan cycle into the totals
    pub fn absorb(&mut self, cycle: &WalkStats) {
        self.cycles += 1;
        self.files_processed += cycle.files_processed;
        self.records_parsed += cycle.records_parsed;
        self.records_dispatched += cycle.records_dispatched;
    }

    /// Print a run summary together with per-sink counters
    pub fn print_summary(&self, sink_metrics: &[(String, MetricsSnapshot)]) {
        println!("\nRun summary");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Scan cycles: {}", self.cycles);
        println!("  Files processed: {}", self.files_processed);
        println!("  Records parsed: {}", self.records_parsed);
        println!("  Records dispatched: {}", self.records_dispatched);

        println!("\nSinks");
        for (name, snapshot) in sink_metrics {
            println!(
                "  {} - batches: {}, failures: {}, records accepted: {}",
                name, snapshot.send_count, snapshot.failure_count, snapshot.records_accepted
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_accumulates() {
        let mut stats = RunStats::default();
        stats.absorb(&WalkStats {
            files_processed: 2,
            records_parsed: 10,
            records_dispatched: 20,
        });
        stats.absorb(&WalkStats {
            files_processed: 1,
            records_parsed: 3,
            records_dispatched: 0,
        });
        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.records_parsed, 13);
        assert_eq!(stats.records_dispatched, 20);
    }
}
