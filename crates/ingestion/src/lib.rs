//! # Ingestion
//!
//! Turns spooled check-result files into [`contracts::MetricRecord`] batches.
//!
//! Two pieces:
//! - [`PerfdataParser`]: tolerant line/field/token parsing of one spool file
//! - [`SpoolWalker`]: directory scan, parse → dispatch per file, and the
//!   delete-or-retain decision

mod parser;
mod spool;

pub use parser::PerfdataParser;
pub use spool::{SpoolWalker, WalkStats, HOST_SPOOL_FILE, RETRY_MARKER_PREFIX, SERVICE_SPOOL_FILE};
