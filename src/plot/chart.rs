//! The faceted forecast chart.
//!
//! `ForecastChart` owns the last successfully rendered data and its SVG. Each
//! `update` rebuilds everything from scratch; a failed rebuild is logged and
//! leaves the previous render in place.

use std::collections::HashMap;

use plotters::style::RGBColor;
use tracing::{debug, error};

use crate::domain::{ForecastRecord, TruthRecord};
use crate::error::AppError;
use crate::plot::ascii::render_facet_ascii;
use crate::plot::facet::{FacetData, build_facets};
use crate::plot::hover::{HoverSummary, summarize};
use crate::plot::layout::{ChartLayout, LayoutConfig};
use crate::plot::palette::Palette;
use crate::plot::scale::TimeDomain;
use crate::plot::svg::{SvgScene, render_svg};

/// Viewport width assumed until the first `update_layout`.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1200.0;

#[derive(Debug, Clone)]
struct Rendered {
    truth: Vec<TruthRecord>,
    forecasts: Vec<ForecastRecord>,
    facets: Vec<FacetData>,
    layout: ChartLayout,
    colors: HashMap<String, RGBColor>,
    legend: Vec<String>,
    svg: String,
}

#[derive(Debug, Clone)]
struct Hover {
    facet: usize,
    summary: HoverSummary,
}

#[derive(Debug, Clone)]
pub struct ForecastChart {
    config: LayoutConfig,
    viewport_width: f64,
    palette: Palette,
    rendered: Option<Rendered>,
    hover: Option<Hover>,
}

impl Default for ForecastChart {
    fn default() -> Self {
        Self::new(LayoutConfig::default(), DEFAULT_VIEWPORT_WIDTH)
    }
}

impl ForecastChart {
    pub fn new(config: LayoutConfig, viewport_width: f64) -> Self {
        Self {
            config,
            viewport_width,
            palette: Palette::default(),
            rendered: None,
            hover: None,
        }
    }

    /// Replace the chart contents. On error the previous render is kept.
    pub fn update(&mut self, truth: &[TruthRecord], forecasts: &[ForecastRecord]) -> Result<(), AppError> {
        match self.render(truth.to_vec(), forecasts.to_vec()) {
            Ok(rendered) => {
                debug!(
                    facets = rendered.layout.facets.len(),
                    per_row = rendered.layout.facets_per_row,
                    truth = truth.len(),
                    forecasts = forecasts.len(),
                    "chart rendered"
                );
                self.rendered = Some(rendered);
                self.hover = None;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "chart render failed; keeping previous render");
                Err(e)
            }
        }
    }

    /// Recompute the grid for a new viewport width and re-render the last data.
    pub fn update_layout(&mut self, viewport_width: f64) -> Result<(), AppError> {
        self.viewport_width = viewport_width;
        let Some(previous) = self.rendered.as_ref() else {
            return Ok(());
        };
        let (truth, forecasts) = (previous.truth.clone(), previous.forecasts.clone());
        self.update(&truth, &forecasts)
    }

    /// Hover at a canvas point. Returns the summary, or `None` (hidden) when
    /// the point is outside every plotting area or the facet is empty there.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<&HoverSummary> {
        self.hover = self.rendered.as_ref().and_then(|r| {
            let (index, layout) = r.layout.facet_at(x, y)?;
            let target_day = layout.x_scale.invert(x - layout.rect.x);
            let facet = r.facets.get(index)?;
            summarize(facet, target_day, x).map(|summary| Hover { facet: index, summary })
        });
        self.hover.as_ref().map(|h| &h.summary)
    }

    pub fn pointer_leave(&mut self) {
        self.hover = None;
    }

    pub fn hover(&self) -> Option<&HoverSummary> {
        self.hover.as_ref().map(|h| &h.summary)
    }

    pub fn layout(&self) -> Option<&ChartLayout> {
        self.rendered.as_ref().map(|r| &r.layout)
    }

    pub fn facets(&self) -> &[FacetData] {
        self.rendered.as_ref().map(|r| r.facets.as_slice()).unwrap_or_default()
    }

    /// Model names shown in the legend, after `Observed`.
    pub fn legend(&self) -> &[String] {
        self.rendered.as_ref().map(|r| r.legend.as_slice()).unwrap_or_default()
    }

    /// SVG of the last successful render, without the hover overlay.
    pub fn svg(&self) -> Option<&str> {
        self.rendered.as_ref().map(|r| r.svg.as_str())
    }

    /// SVG including the hover line and tooltip, when a hover is active.
    pub fn svg_with_hover(&self) -> Result<Option<String>, AppError> {
        let Some(r) = self.rendered.as_ref() else {
            return Ok(None);
        };
        let Some(hover) = self.hover.as_ref() else {
            return Ok(Some(r.svg.clone()));
        };
        let scene = SvgScene {
            layout: &r.layout,
            facets: &r.facets,
            colors: &r.colors,
            legend: &r.legend,
            hover: r.layout.facets.get(hover.facet).map(|f| (f, &hover.summary)),
        };
        render_svg(&scene).map(Some)
    }

    /// Text rendering of one location's facet.
    pub fn render_text(&self, location: &str, width: usize, height: usize) -> Option<String> {
        let r = self.rendered.as_ref()?;
        let domain = r.layout.time_domain?;
        let facet = r.facets.iter().find(|f| f.location == location)?;
        Some(render_facet_ascii(facet, domain, width, height))
    }

    fn render(&mut self, truth: Vec<TruthRecord>, forecasts: Vec<ForecastRecord>) -> Result<Rendered, AppError> {
        let facets = build_facets(&truth, &forecasts);
        let domain = TimeDomain::from_dates(truth.iter().map(|r| r.date).chain(forecasts.iter().map(|r| r.date)));
        let layout = ChartLayout::build(&self.config, self.viewport_width, &facets, domain);

        let mut colors = HashMap::new();
        for record in &forecasts {
            if !colors.contains_key(&record.model) {
                colors.insert(record.model.clone(), self.palette.color(&record.model));
            }
        }
        let mut legend: Vec<String> = colors.keys().cloned().collect();
        legend.sort();

        let svg = render_svg(&SvgScene {
            layout: &layout,
            facets: &facets,
            colors: &colors,
            legend: &legend,
            hover: None,
        })?;

        Ok(Rendered {
            truth,
            forecasts,
            facets,
            layout,
            colors,
            legend,
            svg,
        })
    }
}
