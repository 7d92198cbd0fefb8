//! Hover queries: nearest points under the pointer and the tooltip they produce.

use chrono::NaiveDate;
use serde::Serialize;

use crate::plot::facet::FacetData;
use crate::plot::scale::day_number;

/// Observed values are only shown this close (in days) to the forecast date.
pub const TRUTH_MATCH_DAYS: f64 = 3.0;

/// The item whose day is nearest `target`. Ties keep the earlier item.
pub fn find_closest<'a, P>(
    items: impl IntoIterator<Item = &'a P>,
    target: f64,
    day: impl Fn(&P) -> f64,
) -> Option<&'a P>
where
    P: 'a,
{
    let mut best: Option<(&P, f64)> = None;
    for item in items {
        let distance = (day(item) - target).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((item, distance)),
        }
    }
    best.map(|(item, _)| item)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelValue {
    pub model: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Everything the tooltip shows for one pointer position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverSummary {
    pub location: String,
    /// Date of the first model's nearest point, or of the observation when
    /// the facet has no forecasts.
    pub date: NaiveDate,
    pub observed: Option<f64>,
    pub forecasts: Vec<ModelValue>,
    /// Canvas x of the hover line.
    pub x: f64,
}

impl HoverSummary {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.location.clone(), format!("Date: {}", self.date.format("%b %-d, %Y"))];
        if let Some(observed) = self.observed {
            lines.push(format!("Observed: {}", display_value(observed)));
        }
        for f in &self.forecasts {
            lines.push(format!("{}: {}", f.model, display_value(f.value)));
        }
        lines
    }
}

fn display_value(value: f64) -> i64 {
    value.round() as i64
}

/// Hover summary for a facet at `target_day`, or `None` when the facet has
/// nothing to show.
pub fn summarize(facet: &FacetData, target_day: f64, x: f64) -> Option<HoverSummary> {
    let truth = find_closest(facet.truth_points(), target_day, |p| day_number(p.date));

    let forecasts: Vec<ModelValue> = facet
        .models
        .iter()
        .filter_map(|series| {
            find_closest(&series.points, target_day, |p| day_number(p.date)).map(|p| ModelValue {
                model: series.model.clone(),
                date: p.date,
                value: p.value,
            })
        })
        .collect();

    let (date, observed) = match (forecasts.first(), truth) {
        (Some(first), truth) => {
            let observed = truth
                .filter(|t| (day_number(t.date) - day_number(first.date)).abs() <= TRUTH_MATCH_DAYS)
                .map(|t| t.value);
            (first.date, observed)
        }
        (None, Some(truth)) => (truth.date, Some(truth.value)),
        (None, None) => return None,
    };

    Some(HoverSummary {
        location: facet.location.clone(),
        date,
        observed,
        forecasts,
        x,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Days;

    use super::*;
    use crate::domain::{ForecastRecord, Horizon, TruthRecord};
    use crate::plot::facet::build_facets;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn closest_point_prefers_smallest_distance_then_first() {
        let d = date(2024, 12, 28);
        let dates = [d - Days::new(5), d - Days::new(1), d + Days::new(3)];
        let found = find_closest(&dates, day_number(d), |x| day_number(*x));
        assert_eq!(found, Some(&(d - Days::new(1))));

        let tied = [d - Days::new(2), d + Days::new(2)];
        let found = find_closest(&tied, day_number(d), |x| day_number(*x));
        assert_eq!(found, Some(&(d - Days::new(2))));

        let empty: [NaiveDate; 0] = [];
        assert!(find_closest(&empty, 0.0, |x| day_number(*x)).is_none());
    }

    fn record(model: &str, d: NaiveDate, h: i64, value: f64) -> ForecastRecord {
        ForecastRecord {
            location_name: "Ohio".to_string(),
            date: d,
            horizon: Horizon::new(h).unwrap(),
            value,
            model: model.to_string(),
        }
    }

    fn observed(d: NaiveDate, value: f64) -> TruthRecord {
        TruthRecord {
            location_name: "Ohio".to_string(),
            date: d,
            value: Some(value),
        }
    }

    #[test]
    fn tooltip_shows_truth_near_the_forecast_date() {
        let truth = vec![observed(date(2024, 12, 21), 101.4), observed(date(2024, 12, 28), 120.6)];
        let forecasts = vec![
            record("ARIMA", date(2024, 12, 28), 1, 118.2),
            record("ARIMA", date(2025, 1, 4), 2, 130.0),
            record("ARGO", date(2024, 12, 28), 1, 99.5),
        ];
        let facets = build_facets(&truth, &forecasts);

        let summary = summarize(&facets[0], day_number(date(2024, 12, 29)), 10.0).unwrap();
        assert_eq!(
            summary.lines(),
            vec!["Ohio", "Date: Dec 28, 2024", "Observed: 121", "ARIMA: 118", "ARGO: 100"]
        );
    }

    #[test]
    fn distant_truth_is_left_out() {
        let truth = vec![observed(date(2024, 12, 14), 50.0)];
        let forecasts = vec![record("ARIMA", date(2025, 1, 4), 2, 60.0)];
        let facets = build_facets(&truth, &forecasts);

        let summary = summarize(&facets[0], day_number(date(2025, 1, 4)), 0.0).unwrap();
        assert_eq!(summary.observed, None);
        assert_eq!(summary.lines(), vec!["Ohio", "Date: Jan 4, 2025", "ARIMA: 60"]);
    }

    #[test]
    fn truth_alone_when_no_forecasts() {
        let truth = vec![observed(date(2024, 12, 14), 50.0), observed(date(2024, 12, 21), 55.0)];
        let facets = build_facets(&truth, &[]);

        let summary = summarize(&facets[0], day_number(date(2024, 12, 20)), 0.0).unwrap();
        assert_eq!(summary.date, date(2024, 12, 21));
        assert_eq!(summary.observed, Some(55.0));
        assert!(summary.forecasts.is_empty());
    }
}
