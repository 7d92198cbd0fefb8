//! Forecast aggregation: every registered model's file set for one as-of date,
//! normalized, replicate-averaged and merged into one flat collection.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::data::transport::{Transport, fetch_text};
use crate::domain::{ForecastRecord, ForecastRow, Horizon, ModelDescriptor, ReplicatePolicy};
use crate::error::AppError;
use crate::io::parse_forecasts;
use crate::report::LoadSummary;

pub struct ForecastLoader<T: ?Sized> {
    transport: Arc<T>,
    forecast_dir: String,
    models: Vec<ModelDescriptor>,
}

impl<T: Transport + ?Sized> ForecastLoader<T> {
    pub fn new(transport: Arc<T>, settings: &Settings) -> Self {
        Self {
            transport,
            forecast_dir: settings.forecast_dir.clone(),
            models: settings.models.clone(),
        }
    }

    /// Load every model for `as_of`. Never fails as a whole: a model whose
    /// files cannot be fetched is logged and contributes nothing.
    pub async fn load_forecasts(&self, as_of: NaiveDate) -> Vec<ForecastRecord> {
        let loads = self.models.iter().map(|model| self.load_model(model, as_of));
        let results = join_all(loads).await;

        let mut summary = LoadSummary::new(as_of);
        let mut out = Vec::new();
        for (model, result) in self.models.iter().zip(results) {
            match result {
                Ok(rows) => {
                    summary.record_model(&model.display_name, &rows);
                    out.extend(rows.into_iter().map(|row| row.into_record(&model.display_name)));
                }
                Err(e) => {
                    warn!(model = %model.display_name, error = %e, "model excluded");
                    summary.record_failure(&model.display_name);
                }
            }
        }

        info!(%as_of, records = out.len(), "{}", summary);
        out
    }

    async fn load_model(&self, model: &ModelDescriptor, as_of: NaiveDate) -> Result<Vec<ForecastRow>, AppError> {
        let paths = model.file_paths(as_of);
        match model.replicates {
            ReplicatePolicy::Single => {
                let Some(relative) = paths.first() else {
                    return Ok(Vec::new());
                };
                let path = self.full_path(relative);
                let text = fetch_text(self.transport.as_ref(), &path).await?;
                Ok(parse_forecasts(model.format, &text))
            }
            ReplicatePolicy::Individual | ReplicatePolicy::Consolidated => {
                let fetches = paths.iter().map(|p| self.fetch_replicate(model, p));
                let files = join_all(fetches).await;

                let total = files.len();
                let replicates: Vec<Vec<ForecastRow>> = files.into_iter().flatten().collect();
                debug!(
                    model = %model.display_name,
                    present = replicates.len(),
                    total,
                    "replicate files fetched"
                );
                Ok(average_replicates(replicates.into_iter().flatten()))
            }
        }
    }

    /// One replicate file; a failure only costs this file.
    async fn fetch_replicate(&self, model: &ModelDescriptor, relative: &str) -> Option<Vec<ForecastRow>> {
        let path = self.full_path(relative);
        match fetch_text(self.transport.as_ref(), &path).await {
            Ok(text) => Some(parse_forecasts(model.format, &text)),
            Err(e) => {
                warn!(model = %model.display_name, error = %e, "replicate file skipped");
                None
            }
        }
    }

    fn full_path(&self, relative: &str) -> String {
        format!("{}/{relative}", self.forecast_dir)
    }
}

/// Mean value per `(location, date, horizon)` over every replicate row.
/// Groups come out in first-seen order. The mean is kept incrementally so
/// large finite values never overflow; a non-finite result drops the group.
pub fn average_replicates(rows: impl IntoIterator<Item = ForecastRow>) -> Vec<ForecastRow> {
    let mut index: HashMap<(String, NaiveDate, Horizon), usize> = HashMap::new();
    let mut groups: Vec<(ForecastRow, usize)> = Vec::new();

    for row in rows {
        let key = (row.location_name.clone(), row.date, row.horizon);
        match index.get(&key) {
            Some(&i) => {
                let (mean, n) = &mut groups[i];
                *n += 1;
                mean.value += (row.value - mean.value) / *n as f64;
            }
            None => {
                index.insert(key, groups.len());
                groups.push((row, 1));
            }
        }
    }

    groups
        .into_iter()
        .map(|(row, _)| row)
        .filter(|row| {
            let keep = row.value.is_finite();
            if !keep {
                warn!(location = %row.location_name, date = %row.date, "replicate mean not finite; dropped");
            }
            keep
        })
        .collect()
}
