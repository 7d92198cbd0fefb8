//! Input helpers.
//!
//! - team-format and ground-truth CSV normalization (`ingest`)

pub mod ingest;

pub use ingest::*;
