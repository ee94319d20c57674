//! # Dispatcher
//!
//! Fan-out of parsed metric batches to the configured backend sinks.
//!
//! The [`Dispatcher`] owns an immutable, constructed-once list of sink
//! instances; `dispatch` hands every sink the full batch for one spool file
//! and sums the per-sink accept counts. The spool walker uses that sum as
//! its delete-or-retain signal.

mod dispatcher;
mod metrics;
mod path;
mod sinks;

pub use crate::dispatcher::{Dispatcher, SinkInstance};
pub use crate::metrics::{MetricsSnapshot, SinkMetrics};
pub use crate::path::{build_path, sanitize};
pub use crate::sinks::{BinarySink, ConsoleSink, HttpSink, LineSink, StatsdSink, TcpSinkConfig};
