//! `forecast-facets` library crate.
//!
//! Loads ground truth and multi-model hospitalization forecasts, normalizes the
//! heterogeneous file formats into one record shape, and renders them as a
//! grid of per-location facets with hover inspection.
//!
//! - `data`: transport seam, ground truth and forecast loaders
//! - `io`: format normalizer (CSV to records)
//! - `plot`: facet construction, scales, layout, SVG and text rendering
//! - `app`: session state, reducer and debounced relayout

pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod telemetry;
