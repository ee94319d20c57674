//! SpoolWalker - spool directory scan and file lifecycle
//!
//! Walks the spool directory once per cycle: parse each eligible file,
//! hand the batch to the dispatcher, and delete the file only when at
//! least one sink accepted the data. This is best-effort at-least-one-sink
//! delivery, not exactly-once: a batch accepted by one sink and rejected
//! by another is still considered delivered.

use std::path::Path;

use contracts::{Dispatch, RelayError};
use tracing::{debug, error, info, warn};

use crate::parser::PerfdataParser;

/// Live host perfdata file the daemon is still writing to
pub const HOST_SPOOL_FILE: &str = "host-perfdata";
/// Live service perfdata file the daemon is still writing to
pub const SERVICE_SPOOL_FILE: &str = "service-perfdata";
/// Files carrying this prefix are parked for retry by an external process
pub const RETRY_MARKER_PREFIX: &str = "_";

/// A file is deleted once more than this many records were accepted
const MIN_DISPATCHED: usize = 0;

/// Aggregate counts for one directory scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Files examined this cycle (zero-byte files included)
    pub files_processed: u64,
    /// Records produced by the parser
    pub records_parsed: u64,
    /// Summed accept counts reported by the dispatcher
    pub records_dispatched: u64,
}

impl WalkStats {
    fn absorb(&mut self, parsed: usize, dispatched: usize) {
        self.files_processed += 1;
        self.records_parsed += parsed as u64;
        self.records_dispatched += dispatched as u64;
    }
}

/// Directory scanner that feeds the dispatcher
#[derive(Debug)]
pub struct SpoolWalker {
    parser: PerfdataParser,
    /// Test mode: never delete, only observe
    keep_files: bool,
}

impl SpoolWalker {
    pub fn new(parser: PerfdataParser, keep_files: bool) -> Self {
        Self { parser, keep_files }
    }

    /// Process every eligible file in `dir` once.
    ///
    /// # Errors
    /// A directory listing failure or an unreadable spool file is fatal for
    /// the cycle; everything already processed keeps its delete/retain
    /// outcome and the failing file is left in place.
    pub async fn process_directory<D: Dispatch>(
        &self,
        dir: &Path,
        dispatcher: &mut D,
    ) -> Result<WalkStats, RelayError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| RelayError::spool_read(dir.display().to_string(), e.to_string()))?;

        let mut stats = WalkStats::default();
        for entry in entries {
            let entry = entry
                .map_err(|e| RelayError::spool_read(dir.display().to_string(), e.to_string()))?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();

            if !self.eligible(&name) {
                debug!(file = %name, "skipping reserved spool entry");
                continue;
            }
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if entry
                .metadata()
                .map_err(|e| RelayError::spool_read(path.display().to_string(), e.to_string()))?
                .len()
                == 0
            {
                // nothing to parse or dispatch
                debug!(file = %name, "zero-byte spool file");
                self.remove(&path);
                stats.absorb(0, 0);
                continue;
            }

            let records = self.parser.parse_file(&path)?;
            if records.is_empty() {
                debug!(file = %name, "no usable perfdata, deleting");
                self.remove(&path);
                stats.absorb(0, 0);
                continue;
            }

            let dispatched = dispatcher.dispatch(&records).await;
            if dispatched > MIN_DISPATCHED {
                debug!(file = %name, records = records.len(), dispatched, "batch delivered");
                self.remove(&path);
            } else {
                warn!(
                    file = %name,
                    records = records.len(),
                    "no sink accepted the batch, keeping file for the next scan"
                );
            }
            stats.absorb(records.len(), dispatched);
        }

        info!(
            files = stats.files_processed,
            parsed = stats.records_parsed,
            dispatched = stats.records_dispatched,
            "spool scan complete"
        );
        Ok(stats)
    }

    /// The two live sink files and retry-parked files are not ours to touch
    fn eligible(&self, name: &str) -> bool {
        name != HOST_SPOOL_FILE
            && name != SERVICE_SPOOL_FILE
            && !name.starts_with(RETRY_MARKER_PREFIX)
    }

    fn remove(&self, path: &Path) {
        if self.keep_files {
            debug!(file = %path.display(), "test mode, keeping file");
            return;
        }
        if let Err(e) = std::fs::remove_file(path) {
            error!(file = %path.display(), error = %e, "could not remove spool file");
        }
    }
}
