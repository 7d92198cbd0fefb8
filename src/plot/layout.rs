//! Facet grid geometry.
//!
//! Every facet gets the same plotting rectangle size and shares one time
//! scale; only the value scale differs per location. All coordinates are
//! canvas pixels with the origin at the top-left.

use crate::plot::facet::FacetData;
use crate::plot::scale::{LinearScale, TimeDomain, TimeScale, value_max};

/// Width reserved right of the grid for the legend.
pub const LEGEND_WIDTH: f64 = 160.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub facet_width: f64,
    pub facet_height: f64,
    pub facet_padding: f64,
    pub margins: Margins,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            facet_width: 500.0,
            facet_height: 300.0,
            facet_padding: 40.0,
            margins: Margins {
                top: 40.0,
                right: 80.0,
                bottom: 40.0,
                left: 60.0,
            },
        }
    }
}

impl LayoutConfig {
    pub fn plot_width(&self) -> f64 {
        self.facet_width - self.margins.right
    }

    pub fn plot_height(&self) -> f64 {
        self.facet_height - self.margins.bottom
    }

    pub fn facets_per_row(&self, viewport_width: f64) -> usize {
        let available = viewport_width - self.margins.left - self.margins.right;
        let fit = (available / self.facet_width).floor();
        if fit.is_finite() && fit >= 1.0 { fit as usize } else { 1 }
    }

    pub fn canvas_height(&self, facet_count: usize, per_row: usize) -> f64 {
        let rows = facet_count.div_ceil(per_row.max(1));
        rows as f64 * (self.facet_height + self.facet_padding) + self.margins.top + self.margins.bottom
    }

    /// Top-left corner of the legend.
    pub fn legend_origin(&self, per_row: usize) -> (f64, f64) {
        (self.margins.left + per_row as f64 * self.facet_width, self.margins.top)
    }

    pub fn canvas_width(&self, viewport_width: f64, per_row: usize) -> f64 {
        viewport_width.max(self.legend_origin(per_row).0 + LEGEND_WIDTH)
    }

    /// Plotting rectangle of the facet at `(row, col)`.
    pub fn plot_rect(&self, row: usize, col: usize) -> PlotRect {
        PlotRect {
            x: self.margins.left + col as f64 * self.facet_width,
            y: self.margins.top + row as f64 * (self.facet_height + self.facet_padding),
            width: self.plot_width(),
            height: self.plot_height(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacetLayout {
    pub location: String,
    pub row: usize,
    pub col: usize,
    pub rect: PlotRect,
    pub x_scale: TimeScale,
    pub y_scale: LinearScale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub facets_per_row: usize,
    pub width: f64,
    pub height: f64,
    /// Top-left corner of the legend, right of the last grid column.
    pub legend_origin: (f64, f64),
    /// `None` only when there is nothing to plot.
    pub time_domain: Option<TimeDomain>,
    pub facets: Vec<FacetLayout>,
}

impl ChartLayout {
    pub fn build(config: &LayoutConfig, viewport_width: f64, facets: &[FacetData], domain: Option<TimeDomain>) -> Self {
        let per_row = config.facets_per_row(viewport_width);
        let facet_layouts = match domain {
            Some(domain) => facets
                .iter()
                .enumerate()
                .map(|(i, facet)| {
                    let (row, col) = (i / per_row, i % per_row);
                    let max = value_max(facet.truth_points().map(|p| p.value).chain(facet.forecast_values()));
                    FacetLayout {
                        location: facet.location.clone(),
                        row,
                        col,
                        rect: config.plot_rect(row, col),
                        x_scale: TimeScale::new(domain, config.plot_width()),
                        y_scale: LinearScale::new(max),
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        Self {
            facets_per_row: per_row,
            width: config.canvas_width(viewport_width, per_row),
            height: config.canvas_height(facet_layouts.len(), per_row),
            legend_origin: config.legend_origin(per_row),
            time_domain: domain,
            facets: facet_layouts,
        }
    }

    /// Facet whose plotting rectangle contains the canvas point.
    pub fn facet_at(&self, x: f64, y: f64) -> Option<(usize, &FacetLayout)> {
        self.facets.iter().enumerate().find(|(_, f)| f.rect.contains(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_follow_viewport_width() {
        let config = LayoutConfig::default();
        assert_eq!(config.facets_per_row(1600.0), 2);
        assert_eq!(config.facets_per_row(1640.0), 3);
        assert_eq!(config.facets_per_row(300.0), 1);
        assert_eq!(config.facets_per_row(0.0), 1);
    }

    #[test]
    fn canvas_height_counts_wrapped_rows() {
        let config = LayoutConfig::default();
        assert_eq!(config.canvas_height(5, 2), 3.0 * 340.0 + 80.0);
        assert_eq!(config.canvas_height(0, 2), 80.0);
    }

    #[test]
    fn plot_rects_tile_the_grid() {
        let config = LayoutConfig::default();
        let rect = config.plot_rect(1, 2);
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (1060.0, 380.0, 420.0, 260.0));
        assert!(rect.contains(1060.0, 380.0));
        assert!(!rect.contains(1500.0, 380.0));
    }
}
