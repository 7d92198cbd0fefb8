//! Facet chart rendering.
//!
//! - `facet`: per-location series grouping and location order
//! - `scale` / `layout`: shared time axis, per-facet value axis, grid geometry
//! - `hover`: nearest-point queries and tooltip text
//! - `svg` / `ascii`: output surfaces
//! - `chart`: the stateful `ForecastChart` tying them together

pub mod ascii;
pub mod chart;
pub mod facet;
pub mod hover;
pub mod layout;
pub mod palette;
pub mod scale;
pub mod svg;

pub use chart::ForecastChart;
pub use facet::{FacetData, build_facets, order_locations};
pub use hover::{HoverSummary, find_closest};
pub use layout::{ChartLayout, FacetLayout, LayoutConfig};
pub use scale::TimeDomain;
