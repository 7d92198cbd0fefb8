//! Load summaries: per-model record and horizon counts for one as-of date.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::domain::ForecastRow;

/// Outcome of one model's load.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    Loaded {
        records: usize,
        /// Record count per horizon, ascending.
        horizons: BTreeMap<u8, usize>,
    },
    Failed,
}

/// Per-model outcomes in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub as_of: NaiveDate,
    pub models: Vec<(String, ModelOutcome)>,
}

impl LoadSummary {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of, models: Vec::new() }
    }

    pub fn record_model(&mut self, name: &str, rows: &[ForecastRow]) {
        self.models.push((
            name.to_string(),
            ModelOutcome::Loaded {
                records: rows.len(),
                horizons: horizon_counts(rows),
            },
        ));
    }

    pub fn record_failure(&mut self, name: &str) {
        self.models.push((name.to_string(), ModelOutcome::Failed));
    }

    pub fn loaded_models(&self) -> usize {
        self.models
            .iter()
            .filter(|(_, o)| matches!(o, ModelOutcome::Loaded { records, .. } if *records > 0))
            .count()
    }
}

/// Row count per horizon, ascending.
pub fn horizon_counts(rows: &[ForecastRow]) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.horizon.get()).or_insert(0) += 1;
    }
    counts
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "forecasts {}: {}/{} models", self.as_of, self.loaded_models(), self.models.len())?;
        for (name, outcome) in &self.models {
            match outcome {
                ModelOutcome::Loaded { records, horizons } => {
                    write!(f, " | {name}={records}")?;
                    if !horizons.is_empty() {
                        let parts: Vec<String> = horizons.iter().map(|(h, n)| format!("h{h}:{n}")).collect();
                        write!(f, " ({})", parts.join(" "))?;
                    }
                }
                ModelOutcome::Failed => write!(f, " | {name}=failed")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Horizon;

    #[test]
    fn summary_lists_models_in_order() {
        let as_of = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
        let row = |h| ForecastRow {
            location_name: "US".to_string(),
            date: as_of,
            horizon: Horizon::new(h).unwrap(),
            value: 1.0,
        };

        let mut summary = LoadSummary::new(as_of);
        summary.record_model("ARIMA", &[row(2), row(1), row(1)]);
        summary.record_failure("ARGO");
        summary.record_model("ARGO2", &[]);

        assert_eq!(summary.loaded_models(), 1);
        assert_eq!(
            summary.to_string(),
            "forecasts 2024-12-28: 1/3 models | ARIMA=3 (h1:2 h2:1) | ARGO=failed | ARGO2=0"
        );
    }
}
