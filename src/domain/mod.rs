//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - canonical records (`ForecastRecord`, `TruthRecord`, `Horizon`)
//! - team file layouts (`ParseFormat`, `RowLayout`)
//! - static model configuration (`ModelDescriptor`, `default_models`)

pub mod types;

pub use types::*;
