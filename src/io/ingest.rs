//! CSV ingest and normalization.
//!
//! Every team writes forecasts in its own layout. This module turns one raw
//! payload into canonical rows, following these rules:
//! - **Row-level tolerance**: a bad row is skipped, never fatal to the batch
//! - **Batch-level fallback**: an empty payload or missing headers yields an
//!   empty collection and a warning
//! - **No I/O**: callers hand in text; fetching lives in `data`

use std::collections::HashMap;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{
    AGGREGATE_LOCATION, ColumnMap, ForecastRow, Horizon, NATIONAL_TOKEN, ParseFormat, PositionalMap, RowLayout,
    TruthRecord,
};
use crate::report::horizon_counts;

const TRUTH_DATE: &str = "date";
const TRUTH_LOCATION: &str = "location_name";
const TRUTH_VALUE: &str = "total_hosp";
const MISSING_MARKER: &str = "NA";

/// Parse the observed-data file (`date`, `location_name`, `total_hosp`).
pub fn parse_truth(text: &str) -> Vec<TruthRecord> {
    let mut reader = reader_for(text);
    let Some(header_map) = read_header_map(&mut reader) else {
        warn!("ground truth payload has no header row");
        return Vec::new();
    };

    let (Some(&date_idx), Some(&loc_idx), Some(&value_idx)) = (
        header_map.get(TRUTH_DATE),
        header_map.get(TRUTH_LOCATION),
        header_map.get(TRUTH_VALUE),
    ) else {
        warn!(columns = ?header_map.keys().collect::<Vec<_>>(), "ground truth headers missing required columns");
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut rows_read = 0usize;
    for result in reader.records() {
        rows_read += 1;
        let Ok(record) = result else { continue };

        let Some(date) = field(&record, date_idx).and_then(parse_date) else {
            continue;
        };
        let Some(location_name) = field(&record, loc_idx) else {
            continue;
        };
        let value = match field(&record, value_idx) {
            Some(MISSING_MARKER) => None,
            Some(raw) => match parse_finite(raw) {
                Some(v) => Some(v),
                None => continue,
            },
            None => continue,
        };

        out.push(TruthRecord {
            location_name: location_name.to_string(),
            date,
            value,
        });
    }

    debug!(rows_read, rows_used = out.len(), "parsed ground truth");
    out
}

/// Parse one forecast file under the given team format.
pub fn parse_forecasts(format: ParseFormat, text: &str) -> Vec<ForecastRow> {
    let rows = match format.layout() {
        RowLayout::Named(columns) => parse_named(text, columns, format.rewrites_national()),
        RowLayout::Positional(positions) => parse_positional(text, positions),
    };

    debug!(
        format = format.label(),
        rows = rows.len(),
        horizons = ?horizon_counts(&rows),
        "parsed forecast file"
    );
    rows
}

fn parse_named(text: &str, columns: ColumnMap, rewrite_national: bool) -> Vec<ForecastRow> {
    let mut reader = reader_for(text);
    let Some(header_map) = read_header_map(&mut reader) else {
        warn!("forecast payload has no header row");
        return Vec::new();
    };
    let width = reader.headers().map(StringRecord::len).unwrap_or_default();

    let lookup = |name: &str| header_map.get(name).copied();
    let (Some(loc_idx), Some(horizon_idx), Some(value_idx), Some(date_idx)) = (
        lookup(columns.location),
        lookup(columns.horizon),
        lookup(columns.value),
        lookup(columns.date),
    ) else {
        warn!(columns = ?header_map.keys().collect::<Vec<_>>(), "forecast headers missing required columns");
        return Vec::new();
    };

    let mut out = Vec::new();
    for result in reader.records() {
        let Ok(record) = result else { continue };
        // Malformed rows (wrong column count) are skipped outright.
        if record.len() != width {
            continue;
        }

        let Some(location) = field(&record, loc_idx) else { continue };
        let location = if rewrite_national && location == NATIONAL_TOKEN {
            AGGREGATE_LOCATION
        } else {
            location
        };

        let row = build_row(
            location,
            field(&record, horizon_idx),
            0,
            field(&record, value_idx),
            field(&record, date_idx),
        );
        if let Some(row) = row {
            out.push(row);
        }
    }
    out
}

fn parse_positional(text: &str, positions: PositionalMap) -> Vec<ForecastRow> {
    let mut reader = reader_for(text);
    // The header row is present but ignored; positions are fixed.
    if read_header_map(&mut reader).is_none() {
        warn!("positional forecast payload is empty");
        return Vec::new();
    }

    let mut out = Vec::new();
    for result in reader.records() {
        let Ok(record) = result else { continue };
        let unquoted = |idx: usize| field(&record, idx).map(strip_quotes);

        let Some(location) = unquoted(positions.location) else { continue };
        let row = build_row(
            &location,
            unquoted(positions.horizon).as_deref(),
            positions.horizon_offset,
            unquoted(positions.value).as_deref(),
            unquoted(positions.date).as_deref(),
        );
        if let Some(row) = row {
            out.push(row);
        }
    }
    out
}

fn build_row(
    location: &str,
    horizon: Option<&str>,
    horizon_offset: i64,
    value: Option<&str>,
    date: Option<&str>,
) -> Option<ForecastRow> {
    if location.is_empty() {
        return None;
    }
    let horizon = Horizon::new(parse_integer(horizon?)? + horizon_offset)?;
    let value = parse_finite(value?)?;
    let date = parse_date(date?)?;
    Some(ForecastRow {
        location_name: location.to_string(),
        date,
        horizon,
        value,
    })
}

fn reader_for(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
}

fn read_header_map(reader: &mut csv::Reader<&[u8]>) -> Option<HashMap<String, usize>> {
    let headers = reader.headers().ok()?;
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return None;
    }
    Some(build_header_map(headers))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    strip_quotes(name.trim().trim_start_matches('\u{feff}'))
}

fn field(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn strip_quotes(s: &str) -> String {
    s.replace('"', "")
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_finite(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Integer horizons; `2.0` style values are accepted, `2.5` is not.
fn parse_integer(s: &str) -> Option<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = parse_finite(s)?;
    if v.fract() == 0.0 { Some(v as i64) } else { None }
}
