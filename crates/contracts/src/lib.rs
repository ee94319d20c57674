//! # Contracts
//!
//! Frozen interface contracts, defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are
//! prohibited.
//!
//! ## Data Model
//! - [`MetricRecord`] is the canonical representation of one metric reading:
//!   one spool-file line produces a template record, cloned once per perfdata
//!   token.
//! - Records must carry `valid == true` before they may enter the pipeline;
//!   invalid intermediate parse states never reach a sink.

mod config;
mod error;
mod metric;
mod path_field;
mod sink;

pub use config::*;
pub use error::*;
pub use metric::*;
pub use path_field::PathField;
pub use sink::*;
