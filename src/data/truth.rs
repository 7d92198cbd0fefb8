//! Ground truth: the observed hospitalization series and the default forecast
//! date derived from it.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{error, info};

use crate::config::Settings;
use crate::data::transport::{Transport, fetch_text};
use crate::domain::TruthRecord;
use crate::error::AppError;
use crate::io::parse_truth;

#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruth {
    pub records: Vec<TruthRecord>,
    /// Last observation on/after the cutoff, plus one week.
    pub latest_forecast_date: NaiveDate,
}

pub struct TruthLoader<T: ?Sized> {
    transport: Arc<T>,
    path: String,
    cutoff: NaiveDate,
    retrospective_start: NaiveDate,
    recent_start: NaiveDate,
}

impl<T: Transport + ?Sized> TruthLoader<T> {
    pub fn new(transport: Arc<T>, settings: &Settings) -> Self {
        Self {
            transport,
            path: settings.truth_path(),
            cutoff: settings.truth_cutoff,
            retrospective_start: settings.retrospective_start,
            recent_start: settings.recent_start,
        }
    }

    /// Fetch and parse the truth file, then keep only records on/after the
    /// window start. The forecast date is derived before the window is applied.
    pub async fn load_ground_truth(&self, include_retrospective: bool) -> Result<GroundTruth, AppError> {
        let text = fetch_text(self.transport.as_ref(), &self.path).await.map_err(|e| {
            error!(path = %self.path, error = %e, "ground truth fetch failed");
            e
        })?;

        let records = parse_truth(&text);
        let latest_forecast_date = latest_forecast_date(&records, self.cutoff).ok_or_else(|| {
            error!(path = %self.path, cutoff = %self.cutoff, "no ground truth on or after cutoff");
            AppError::DataUnavailable { cutoff: self.cutoff }
        })?;

        let start = if include_retrospective {
            self.retrospective_start
        } else {
            self.recent_start
        };
        let parsed = records.len();
        let records = window_from(records, start);

        info!(
            parsed,
            kept = records.len(),
            %start,
            %latest_forecast_date,
            "ground truth loaded"
        );

        Ok(GroundTruth {
            records,
            latest_forecast_date,
        })
    }
}

/// Max observation date on/after `cutoff`, plus seven days. `NA` rows count:
/// the date exists even when the value does not.
pub fn latest_forecast_date(records: &[TruthRecord], cutoff: NaiveDate) -> Option<NaiveDate> {
    records
        .iter()
        .map(|r| r.date)
        .filter(|d| *d >= cutoff)
        .max()
        .and_then(|d| d.checked_add_days(Days::new(7)))
}

fn window_from(records: Vec<TruthRecord>, start: NaiveDate) -> Vec<TruthRecord> {
    records.into_iter().filter(|r| r.date >= start).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::data::transport::FetchResponse;

    struct MapTransport(HashMap<String, FetchResponse>);

    #[async_trait]
    impl Transport for MapTransport {
        async fn fetch(&self, path: &str) -> Result<FetchResponse, AppError> {
            Ok(self.0.get(path).cloned().unwrap_or_else(FetchResponse::not_found))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loader(body: Option<&str>) -> TruthLoader<MapTransport> {
        let settings = Settings::default();
        let mut files = HashMap::new();
        if let Some(body) = body {
            files.insert(settings.truth_path(), FetchResponse::ok(body));
        }
        TruthLoader::new(Arc::new(MapTransport(files)), &settings)
    }

    const TRUTH: &str = "\
date,location_name,total_hosp
2023-06-24,US,900
2023-07-01,US,1000
2024-06-29,US,1100
2024-07-06,US,NA
2024-12-14,US,1200
2024-12-21,Ohio,NA
";

    #[tokio::test]
    async fn derives_forecast_date_and_filters_window() {
        let truth = loader(Some(TRUTH)).load_ground_truth(false).await.unwrap();
        assert_eq!(truth.latest_forecast_date, date(2024, 12, 28));
        assert_eq!(truth.records.len(), 3);
        assert!(truth.records.iter().all(|r| r.date >= date(2024, 7, 1)));
        assert_eq!(truth.records[0].value, None);

        let truth = loader(Some(TRUTH)).load_ground_truth(true).await.unwrap();
        assert_eq!(truth.records.len(), 5);
        assert_eq!(truth.records[0].date, date(2023, 7, 1));
    }

    #[tokio::test]
    async fn nothing_after_cutoff_is_data_unavailable() {
        let old = "date,location_name,total_hosp\n2023-07-01,US,1000\n";
        let err = loader(Some(old)).load_ground_truth(true).await.unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn missing_truth_file_is_an_error() {
        let err = loader(None).load_ground_truth(true).await.unwrap_err();
        assert!(matches!(err, AppError::FileAbsent { status: 404, .. }));
    }
}
