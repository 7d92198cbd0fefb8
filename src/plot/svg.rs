//! SVG output via plotters.
//!
//! Each facet gets its own cartesian chart whose plotting area is exactly the
//! facet's [`PlotRect`], so hover hit-testing and drawing agree on geometry.
//! Titles, x ticks, the legend and the hover overlay are drawn on the root
//! area in canvas pixels.

use std::collections::HashMap;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontStyle, FontTransform};
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::AppError;
use crate::plot::facet::FacetData;
use crate::plot::hover::HoverSummary;
use crate::plot::layout::{ChartLayout, FacetLayout, PlotRect};
use crate::plot::palette::TRUTH_COLOR;
use crate::plot::scale::{TimeDomain, day_number, tick_label};

const Y_LABEL_AREA: f64 = 50.0;
const X_LABEL_AREA: f64 = 30.0;
const TICK_LENGTH: i32 = 6;
const LEGEND_ROW: i32 = 20;
const TOOLTIP_LINE: i32 = 16;
const FONT: &str = "sans-serif";

const HOVER_LINE_COLOR: RGBColor = RGBColor(0x99, 0x99, 0x99);
const TOOLTIP_BORDER: RGBColor = RGBColor(0xdd, 0xdd, 0xdd);

/// Everything one SVG render needs.
pub struct SvgScene<'a> {
    pub layout: &'a ChartLayout,
    pub facets: &'a [FacetData],
    pub colors: &'a HashMap<String, RGBColor>,
    /// Model names in legend order.
    pub legend: &'a [String],
    pub hover: Option<(&'a FacetLayout, &'a HoverSummary)>,
}

pub fn render_svg(scene: &SvgScene<'_>) -> Result<String, AppError> {
    let size = (scene.layout.width.ceil() as u32, scene.layout.height.ceil() as u32);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_scene(&root, scene).map_err(|e| AppError::Render(e.to_string()))?;
        root.present().map_err(|e| AppError::Render(e.to_string()))?;
    }
    Ok(svg)
}

fn draw_scene<DB>(root: &DrawingArea<DB, Shift>, scene: &SvgScene<'_>) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE)?;

    if let Some(domain) = scene.layout.time_domain {
        let ticks = domain.ticks();
        for (layout, facet) in scene.layout.facets.iter().zip(scene.facets) {
            draw_facet(root, layout, facet, scene.colors, domain, &ticks)?;
        }
    }

    draw_legend(root, scene)?;

    if let Some((layout, summary)) = scene.hover {
        draw_hover(root, &layout.rect, summary)?;
    }
    Ok(())
}

fn draw_facet<DB>(
    root: &DrawingArea<DB, Shift>,
    layout: &FacetLayout,
    facet: &FacetData,
    colors: &HashMap<String, RGBColor>,
    domain: TimeDomain,
    ticks: &[chrono::NaiveDate],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    let rect = layout.rect;
    let (canvas_w, canvas_h) = root.dim_in_pixel();
    let area = root.margin(
        rect.y as i32,
        canvas_h as i32 - (rect.y + rect.height + X_LABEL_AREA) as i32,
        (rect.x - Y_LABEL_AREA) as i32,
        canvas_w as i32 - (rect.x + rect.width) as i32,
    );

    let x_range = day_number(domain.start)..day_number(domain.end);
    let mut chart = ChartBuilder::on(&area)
        .margin(0)
        .set_label_area_size(LabelAreaPosition::Left, Y_LABEL_AREA as u32)
        .set_label_area_size(LabelAreaPosition::Bottom, X_LABEL_AREA as u32)
        .build_cartesian_2d(x_range, 0.0..layout.y_scale.max())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .label_style((FONT, 10).into_font())
        .draw()?;

    for segment in &facet.truth_segments {
        chart.draw_series(LineSeries::new(
            segment.iter().map(|p| (day_number(p.date), p.value.round())),
            TRUTH_COLOR.stroke_width(2),
        ))?;
    }

    for series in &facet.models {
        let color = colors.get(&series.model).copied().unwrap_or(BLACK);
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|p| (day_number(p.date), p.value.round()))
            .collect();
        chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(1)))?;
        chart.draw_series(points.iter().map(|&xy| Circle::new(xy, 3, color.filled())))?;
    }

    // Bottom axis with our own tick positions.
    let bottom = (rect.y + rect.height) as i32;
    let left = rect.x as i32;
    let right = (rect.x + rect.width) as i32;
    root.draw(&PathElement::new(vec![(left, bottom), (right, bottom)], BLACK.stroke_width(1)))?;
    // Long domains turn the labels to run upward from the tick.
    let tick_style = if domain.is_long() {
        (FONT, 10)
            .into_font()
            .transform(FontTransform::Rotate270)
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center))
    } else {
        (FONT, 10).into_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Top))
    };
    for &tick in ticks {
        let x = (rect.x + layout.x_scale.apply(tick)).round() as i32;
        root.draw(&PathElement::new(vec![(x, bottom), (x, bottom + TICK_LENGTH)], BLACK.stroke_width(1)))?;
        root.draw(&Text::new(tick_label(tick), (x, bottom + TICK_LENGTH + 2), tick_style.clone()))?;
    }

    let title_style = (FONT, 14)
        .into_font()
        .style(FontStyle::Bold)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    root.draw(&Text::new(
        facet.location.as_str(),
        ((rect.x + rect.width / 2.0) as i32, (rect.y - 5.0) as i32),
        title_style,
    ))?;

    Ok(())
}

fn draw_legend<DB>(root: &DrawingArea<DB, Shift>, scene: &SvgScene<'_>) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    let (x, y) = (scene.layout.legend_origin.0 as i32, scene.layout.legend_origin.1 as i32);
    let text_style = (FONT, 12).into_font().color(&BLACK).pos(Pos::new(HPos::Left, VPos::Center));

    let entries = std::iter::once(("Observed", TRUTH_COLOR)).chain(
        scene
            .legend
            .iter()
            .map(|name| (name.as_str(), scene.colors.get(name).copied().unwrap_or(BLACK))),
    );
    for (i, (label, color)) in entries.enumerate() {
        let row_y = y + i as i32 * LEGEND_ROW;
        root.draw(&PathElement::new(vec![(x, row_y), (x + 20, row_y)], color.stroke_width(2)))?;
        root.draw(&Text::new(label, (x + 25, row_y), text_style.clone()))?;
    }
    Ok(())
}

fn draw_hover<DB>(root: &DrawingArea<DB, Shift>, rect: &PlotRect, summary: &HoverSummary) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    let x = summary.x.round() as i32;
    root.draw(&PathElement::new(
        vec![(x, rect.y as i32), (x, (rect.y + rect.height) as i32)],
        HOVER_LINE_COLOR.stroke_width(1),
    ))?;

    let lines = summary.lines();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;
    let (left, top) = (x + 10, rect.y as i32 + 10);
    let (width, height) = (longest * 7 + 20, lines.len() as i32 * TOOLTIP_LINE + 12);

    root.draw(&Rectangle::new([(left, top), (left + width, top + height)], WHITE.filled()))?;
    root.draw(&Rectangle::new([(left, top), (left + width, top + height)], TOOLTIP_BORDER.stroke_width(1)))?;

    let style = (FONT, 12).into_font().color(&BLACK).pos(Pos::new(HPos::Left, VPos::Top));
    for (i, line) in lines.iter().enumerate() {
        root.draw(&Text::new(line.as_str(), (left + 10, top + 6 + i as i32 * TOOLTIP_LINE), style.clone()))?;
    }
    Ok(())
}
