//! ASCII rendering of a single facet for terminal output.
//!
//! Fixed-size grid with deterministic output (golden tests):
//! - observed values: `o`, joined by `-`
//! - forecast points: the model's 1-based index within the facet (`*` past 9),
//!   joined by `.`

use crate::plot::facet::FacetData;
use crate::plot::scale::{TimeDomain, day_number, value_max};

const TRUTH_MARK: char = 'o';
const TRUTH_LINE: char = '-';
const FORECAST_LINE: char = '.';

pub fn render_facet_ascii(facet: &FacetData, domain: TimeDomain, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let x_min = day_number(domain.start);
    let x_max = day_number(domain.end);
    let y_max = value_max(facet.truth_points().map(|p| p.value).chain(facet.forecast_values()));
    let cell = |day: f64, value: f64| (map_x(day, x_min, x_max, width), map_y(value, y_max, height));

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so markers overlay them.
    for segment in &facet.truth_segments {
        let cells: Vec<(usize, usize)> = segment.iter().map(|p| cell(day_number(p.date), p.value)).collect();
        draw_polyline(&mut grid, &cells, TRUTH_LINE);
    }
    for series in &facet.models {
        let cells: Vec<(usize, usize)> = series.points.iter().map(|p| cell(day_number(p.date), p.value)).collect();
        draw_polyline(&mut grid, &cells, FORECAST_LINE);
    }

    for p in facet.truth_points() {
        let (x, y) = cell(day_number(p.date), p.value);
        grid[y][x] = TRUTH_MARK;
    }
    for (i, series) in facet.models.iter().enumerate() {
        let mark = model_mark(i);
        for p in &series.points {
            let (x, y) = cell(day_number(p.date), p.value);
            grid[y][x] = mark;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | dates=[{}, {}] | y=[0, {y_max:.0}]\n",
        facet.location, domain.start, domain.end
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&format!("{TRUTH_MARK} = Observed\n"));
    for (i, series) in facet.models.iter().enumerate() {
        out.push_str(&format!("{} = {}\n", model_mark(i), series.model));
    }
    out
}

fn model_mark(index: usize) -> char {
    char::from_digit(index as u32 + 1, 10).unwrap_or('*')
}

fn map_x(day: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((day - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(value: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = (value / y_max).clamp(0.0, 1.0);
    // Largest value on row 0.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], cells: &[(usize, usize)], ch: char) {
    for pair in cells.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        draw_line(grid, x0, y0, x1, y1, ch);
    }
}

/// Integer line drawing (Bresenham). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid.get_mut(y0 as usize).and_then(|row| row.get_mut(x0 as usize)) {
            if *cell == ' ' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
