//! Per-location series, grouped once per render.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{AGGREGATE_LOCATION, ForecastRecord, Horizon, TERRITORY_LOCATION, TruthRecord};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TruthPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub horizon: Horizon,
    pub value: f64,
}

/// One model's points in a facet, ordered by horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSeries {
    pub model: String,
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacetData {
    pub location: String,
    /// Runs of consecutive observed values; an `NA` ends a run.
    pub truth_segments: Vec<Vec<TruthPoint>>,
    /// Models in the order they first appear for this location.
    pub models: Vec<ModelSeries>,
}

impl FacetData {
    fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            truth_segments: Vec::new(),
            models: Vec::new(),
        }
    }

    pub fn truth_points(&self) -> impl Iterator<Item = &TruthPoint> {
        self.truth_segments.iter().flatten()
    }

    pub fn forecast_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.models.iter().flat_map(|m| m.points.iter().map(|p| p.value))
    }

    pub fn has_forecasts(&self) -> bool {
        self.models.iter().any(|m| !m.points.is_empty())
    }
}

/// Total order on locations: `US` first, `Puerto Rico` last, the rest
/// lexicographic.
pub fn compare_locations(a: &str, b: &str) -> std::cmp::Ordering {
    let rank = |s: &str| match s {
        AGGREGATE_LOCATION => 0,
        TERRITORY_LOCATION => 2,
        _ => 1,
    };
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

/// Distinct locations in facet order.
pub fn order_locations<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out.sort_by(|a, b| compare_locations(a, b));
    out
}

/// Group truth and forecasts into one [`FacetData`] per location, in facet order.
pub fn build_facets(truth: &[TruthRecord], forecasts: &[ForecastRecord]) -> Vec<FacetData> {
    let locations = order_locations(
        truth
            .iter()
            .map(|r| r.location_name.as_str())
            .chain(forecasts.iter().map(|r| r.location_name.as_str())),
    );
    let index: HashMap<&str, usize> = locations.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
    let mut facets: Vec<FacetData> = locations.iter().map(|l| FacetData::new(l)).collect();

    // Truth: runs broken at NA.
    let mut open_run: Vec<bool> = vec![false; facets.len()];
    for record in truth {
        let Some(&i) = index.get(record.location_name.as_str()) else {
            continue;
        };
        match record.value.filter(|v| v.is_finite()) {
            Some(value) => {
                if !open_run[i] {
                    facets[i].truth_segments.push(Vec::new());
                    open_run[i] = true;
                }
                if let Some(run) = facets[i].truth_segments.last_mut() {
                    run.push(TruthPoint { date: record.date, value });
                }
            }
            None => open_run[i] = false,
        }
    }

    for record in forecasts {
        let Some(&i) = index.get(record.location_name.as_str()) else {
            continue;
        };
        let point = ForecastPoint {
            date: record.date,
            horizon: record.horizon,
            value: record.value,
        };
        let models = &mut facets[i].models;
        match models.iter().position(|m| m.model == record.model) {
            Some(j) => models[j].points.push(point),
            None => models.push(ModelSeries {
                model: record.model.clone(),
                points: vec![point],
            }),
        }
    }

    for facet in &mut facets {
        for series in &mut facet.models {
            series.points.sort_by_key(|p| p.horizon);
        }
    }

    facets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn truth(loc: &str, d: NaiveDate, value: Option<f64>) -> TruthRecord {
        TruthRecord {
            location_name: loc.to_string(),
            date: d,
            value,
        }
    }

    fn forecast(loc: &str, model: &str, h: i64, value: f64) -> ForecastRecord {
        ForecastRecord {
            location_name: loc.to_string(),
            date: date(2024, 12, 21) + chrono::Days::new(7 * h as u64),
            horizon: Horizon::new(h).unwrap(),
            value,
            model: model.to_string(),
        }
    }

    #[test]
    fn locations_sort_with_pinned_ends() {
        let ordered = order_locations(["Ohio", "US", "Texas", "Puerto Rico", "Ohio"]);
        assert_eq!(ordered, vec!["US", "Ohio", "Texas", "Puerto Rico"]);
    }

    #[test]
    fn truth_runs_break_at_missing_values() {
        let records = vec![
            truth("US", date(2024, 7, 6), Some(1.0)),
            truth("US", date(2024, 7, 13), Some(2.0)),
            truth("US", date(2024, 7, 20), None),
            truth("US", date(2024, 7, 27), Some(4.0)),
        ];
        let facets = build_facets(&records, &[]);
        assert_eq!(facets.len(), 1);
        let runs: Vec<usize> = facets[0].truth_segments.iter().map(Vec::len).collect();
        assert_eq!(runs, vec![2, 1]);
        assert_eq!(facets[0].truth_points().count(), 3);
        assert!(!facets[0].has_forecasts());
    }

    #[test]
    fn forecast_points_are_grouped_by_model_and_ordered_by_horizon() {
        let records = vec![
            forecast("Ohio", "B", 3, 30.0),
            forecast("Ohio", "A", 2, 20.0),
            forecast("Ohio", "B", 1, 10.0),
            forecast("US", "A", 1, 5.0),
        ];
        let facets = build_facets(&[], &records);
        assert_eq!(facets[0].location, "US");

        let ohio = &facets[1];
        let models: Vec<&str> = ohio.models.iter().map(|m| m.model.as_str()).collect();
        assert_eq!(models, vec!["B", "A"]);
        let horizons: Vec<u8> = ohio.models[0].points.iter().map(|p| p.horizon.get()).collect();
        assert_eq!(horizons, vec![1, 3]);
    }
}
