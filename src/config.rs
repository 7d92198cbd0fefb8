//! Runtime settings.
//!
//! Defaults reproduce the production deployment. Any value can be overridden
//! from the environment (a `.env` file is honoured), and the model registry
//! can be swapped for a JSON file.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;

use crate::domain::{ModelDescriptor, default_models};
use crate::error::AppError;

const DEFAULT_DATA_ROOT: &str = ".";
const DEFAULT_FORECAST_DIR: &str = "data/forecasts";
const DEFAULT_TRUTH_DIR: &str = "data/truth";
const DEFAULT_TRUTH_FILE: &str = "imputed_and_stitched_hosp_2024-12-21.csv";
const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 250;
const DEFAULT_RECENT_DATE_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL (`http…`) or local directory every data path is resolved against.
    pub data_root: String,
    pub forecast_dir: String,
    pub truth_dir: String,
    pub truth_file: String,
    /// The latest forecast date is derived from observations on/after this date.
    pub truth_cutoff: NaiveDate,
    /// First observation kept in retrospective mode.
    pub retrospective_start: NaiveDate,
    /// First observation kept otherwise.
    pub recent_start: NaiveDate,
    pub models: Vec<ModelDescriptor>,
    pub resize_debounce: Duration,
    /// How many weekly as-of dates are offered for selection.
    pub recent_date_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: DEFAULT_DATA_ROOT.to_string(),
            forecast_dir: DEFAULT_FORECAST_DIR.to_string(),
            truth_dir: DEFAULT_TRUTH_DIR.to_string(),
            truth_file: DEFAULT_TRUTH_FILE.to_string(),
            truth_cutoff: ymd(2023, 11, 15),
            retrospective_start: ymd(2023, 7, 1),
            recent_start: ymd(2024, 7, 1),
            models: default_models(),
            resize_debounce: Duration::from_millis(DEFAULT_RESIZE_DEBOUNCE_MS),
            recent_date_count: DEFAULT_RECENT_DATE_COUNT,
        }
    }
}

impl Settings {
    /// Defaults overlaid with `FORECAST_*` environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] but reading from an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Self::default();

        if let Some(root) = lookup("FORECAST_DATA_ROOT") {
            settings.data_root = root;
        }
        if let Some(file) = lookup("FORECAST_TRUTH_FILE") {
            settings.truth_file = file;
        }
        if let Some(raw) = lookup("FORECAST_TRUTH_CUTOFF") {
            settings.truth_cutoff = parse_date("FORECAST_TRUTH_CUTOFF", &raw)?;
        }
        if let Some(raw) = lookup("FORECAST_RETROSPECTIVE_START") {
            settings.retrospective_start = parse_date("FORECAST_RETROSPECTIVE_START", &raw)?;
        }
        if let Some(raw) = lookup("FORECAST_RECENT_START") {
            settings.recent_start = parse_date("FORECAST_RECENT_START", &raw)?;
        }
        if let Some(raw) = lookup("FORECAST_RESIZE_DEBOUNCE_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!("FORECAST_RESIZE_DEBOUNCE_MS '{raw}': {e}"))
            })?;
            settings.resize_debounce = Duration::from_millis(ms);
        }
        if let Some(path) = lookup("FORECAST_MODELS_FILE") {
            settings.models = read_models_json(Path::new(&path))?;
        }

        Ok(settings)
    }

    pub fn truth_path(&self) -> String {
        format!("{}/{}", self.truth_dir, self.truth_file)
    }
}

/// Load a model registry from a JSON array of descriptors.
pub fn read_models_json(path: &Path) -> Result<Vec<ModelDescriptor>, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("failed to read models file '{}': {e}", path.display())))?;
    let models: Vec<ModelDescriptor> = serde_json::from_str(&text)
        .map_err(|e| AppError::Config(format!("invalid models file '{}': {e}", path.display())))?;
    if models.is_empty() {
        return Err(AppError::Config(format!("models file '{}' lists no models", path.display())));
    }
    Ok(models)
}

fn parse_date(key: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| AppError::Config(format!("{key} '{raw}': {e}")))
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    // Constant, valid calendar dates.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_production_layout() {
        let s = Settings::default();
        assert_eq!(s.truth_path(), "data/truth/imputed_and_stitched_hosp_2024-12-21.csv");
        assert_eq!(s.retrospective_start, ymd(2023, 7, 1));
        assert_eq!(s.recent_start, ymd(2024, 7, 1));
        assert_eq!(s.models.len(), 9);
        assert_eq!(s.resize_debounce, Duration::from_millis(250));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("FORECAST_DATA_ROOT", "https://example.org/site"),
            ("FORECAST_TRUTH_CUTOFF", "2024-01-01"),
            ("FORECAST_RESIZE_DEBOUNCE_MS", "100"),
        ]);
        let s = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(s.data_root, "https://example.org/site");
        assert_eq!(s.truth_cutoff, ymd(2024, 1, 1));
        assert_eq!(s.resize_debounce, Duration::from_millis(100));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = Settings::from_lookup(|k| (k == "FORECAST_RECENT_START").then(|| "July".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = Settings::from_lookup(|k| {
            (k == "FORECAST_MODELS_FILE").then(|| "/definitely/not/here.json".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
