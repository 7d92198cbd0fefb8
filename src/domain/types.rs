//! Shared domain types.
//!
//! Records are the canonical shapes every team format is normalized into.
//! Descriptors are the static per-model configuration read by the aggregator.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Location that always sorts first in the facet grid.
pub const AGGREGATE_LOCATION: &str = "US";
/// Location that always sorts last in the facet grid.
pub const TERRITORY_LOCATION: &str = "Puerto Rico";
/// Token some team files use for the aggregate location.
pub const NATIONAL_TOKEN: &str = "National";

/// Forecast horizon in weeks ahead, always within `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Horizon(u8);

impl Horizon {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    /// Returns `None` for anything outside `1..=4`.
    pub fn new(raw: i64) -> Option<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&raw) {
            Some(Self(raw as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Horizon> {
        (Self::MIN..=Self::MAX).map(Horizon)
    }
}

impl TryFrom<u8> for Horizon {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value as i64).ok_or_else(|| format!("horizon {value} outside 1..=4"))
    }
}

impl From<Horizon> for u8 {
    fn from(h: Horizon) -> u8 {
        h.0
    }
}

/// A forecast row as produced by a parser, before it is attributed to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub location_name: String,
    pub date: NaiveDate,
    pub horizon: Horizon,
    pub value: f64,
}

impl ForecastRow {
    pub fn into_record(self, model: &str) -> ForecastRecord {
        ForecastRecord {
            location_name: self.location_name,
            date: self.date,
            horizon: self.horizon,
            value: self.value,
            model: model.to_string(),
        }
    }
}

/// Canonical forecast record, stamped with the model's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub location_name: String,
    pub date: NaiveDate,
    pub horizon: Horizon,
    pub value: f64,
    pub model: String,
}

/// Canonical observed record. `value == None` is an explicit `NA`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthRecord {
    pub location_name: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Named columns for a header-indexed forecast file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub location: &'static str,
    pub horizon: &'static str,
    pub value: &'static str,
    pub date: &'static str,
}

/// Fixed field positions for a headerless-by-convention forecast file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalMap {
    pub location: usize,
    pub horizon: usize,
    pub date: usize,
    pub value: usize,
    /// Added to the stored horizon to reach the 1-based canonical value.
    pub horizon_offset: i64,
}

/// How a format locates its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    Named(ColumnMap),
    Positional(PositionalMap),
}

/// Team-specific forecast file layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFormat {
    /// ARIMA team files.
    Arima,
    /// Gradient-boosted (LightGBM) team files.
    GradientBoosted,
    /// ARGO team files: fixed positions, zero-based horizon.
    Positional,
}

impl ParseFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Arima => "arima",
            Self::GradientBoosted => "gradient-boosted",
            Self::Positional => "positional",
        }
    }

    pub fn layout(self) -> RowLayout {
        match self {
            Self::Arima => RowLayout::Named(ColumnMap {
                location: "location_name",
                horizon: "horizon",
                value: "value",
                date: "date",
            }),
            Self::GradientBoosted => RowLayout::Named(ColumnMap {
                location: "location_name",
                horizon: "horizon",
                value: "value",
                date: "date",
            }),
            Self::Positional => RowLayout::Positional(PositionalMap {
                location: 1,
                horizon: 2,
                date: 4,
                value: 7,
                horizon_offset: 1,
            }),
        }
    }

    /// Whether `National` is rewritten to the aggregate location.
    pub fn rewrites_national(self) -> bool {
        matches!(self, Self::Arima | Self::GradientBoosted)
    }
}

/// Which date a model's file is named with, relative to the requested as-of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOffset {
    /// The file carries the as-of date itself.
    SameDay,
    /// The team submits a week in arrears: the file carries as-of minus 7 days.
    WeekPrior,
}

/// How many files make up one submission and how they are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicatePolicy {
    /// One file per submission, used as-is.
    Single,
    /// One file per (horizon 1..=4) x (replicate 1..=3), averaged.
    Individual,
    /// One file per replicate 1..=5 holding every horizon, averaged.
    Consolidated,
}

impl ReplicatePolicy {
    pub const INDIVIDUAL_REPLICATES: u8 = 3;
    pub const CONSOLIDATED_REPLICATES: u8 = 5;
}

/// Static configuration for one forecasting model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Source path token under the forecast directory, e.g. `shihao_team/argo_raw`.
    pub path: String,
    pub display_name: String,
    pub format: ParseFormat,
    pub replicates: ReplicatePolicy,
    pub date_offset: DateOffset,
    /// File name prefix used by replicate file sets.
    pub prefix: String,
}

impl ModelDescriptor {
    pub fn file_date(&self, as_of: NaiveDate) -> NaiveDate {
        match self.date_offset {
            DateOffset::SameDay => as_of,
            DateOffset::WeekPrior => as_of.checked_sub_days(Days::new(7)).unwrap_or(as_of),
        }
    }

    /// Every file path (relative to the forecast directory) that makes up one submission.
    pub fn file_paths(&self, as_of: NaiveDate) -> Vec<String> {
        let date = self.file_date(as_of).format("%Y-%m-%d").to_string();
        match self.replicates {
            ReplicatePolicy::Single => vec![format!("{}_{date}.csv", self.path)],
            ReplicatePolicy::Individual => Horizon::all()
                .flat_map(|h| {
                    (1..=ReplicatePolicy::INDIVIDUAL_REPLICATES).map(move |r| (h, r))
                })
                .map(|(h, r)| format!("{}/{}_h{}_{r}_{date}.csv", self.path, self.prefix, h.get()))
                .collect(),
            ReplicatePolicy::Consolidated => (1..=ReplicatePolicy::CONSOLIDATED_REPLICATES)
                .map(|r| format!("{}/{}_{r}_{date}.csv", self.path, self.prefix))
                .collect(),
        }
    }
}

/// The production model set.
pub fn default_models() -> Vec<ModelDescriptor> {
    fn model(
        path: &str,
        display_name: &str,
        format: ParseFormat,
        replicates: ReplicatePolicy,
        date_offset: DateOffset,
        prefix: &str,
    ) -> ModelDescriptor {
        ModelDescriptor {
            path: path.to_string(),
            display_name: display_name.to_string(),
            format,
            replicates,
            date_offset,
            prefix: prefix.to_string(),
        }
    }

    use DateOffset::{SameDay, WeekPrior};
    use ParseFormat::{Arima, GradientBoosted, Positional};
    use ReplicatePolicy::{Consolidated, Individual, Single};

    vec![
        model("arima/arima", "ARIMA", Arima, Single, WeekPrior, "arima"),
        model("ensemble/Nsemble", "MIGHTE-Nsemble", GradientBoosted, Single, SameDay, "Nsemble"),
        model("ensemble/Joint", "MIGHTE-Joint", GradientBoosted, Single, SameDay, "Joint"),
        model("lgb_mod2023_consolidated", "LGB-2023-C", GradientBoosted, Consolidated, WeekPrior, "lgb_mod2023"),
        model("lgb_mod2023_individual", "LGB-2023-I", GradientBoosted, Individual, WeekPrior, "lgb_mod2023"),
        model("lgb_mod2024_consolidated", "LGB-2024-C", GradientBoosted, Consolidated, WeekPrior, "lgb_mod2024"),
        model("lgb_mod2024_individual", "LGB-2024-I", GradientBoosted, Individual, WeekPrior, "lgb_mod2024"),
        model("shihao_team/argo_raw", "ARGO", Positional, Single, SameDay, "argo_raw"),
        model("shihao_team/argo2_raw", "ARGO2", Positional, Single, SameDay, "argo2_raw"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn horizon_rejects_out_of_range() {
        assert!(Horizon::new(0).is_none());
        assert!(Horizon::new(5).is_none());
        assert!(Horizon::new(-1).is_none());
        assert_eq!(Horizon::new(4).map(Horizon::get), Some(4));
    }

    #[test]
    fn week_prior_models_shift_the_file_date() {
        let models = default_models();
        let arima = models.iter().find(|m| m.display_name == "ARIMA").unwrap();
        let argo = models.iter().find(|m| m.display_name == "ARGO").unwrap();

        assert_eq!(arima.file_date(date(2024, 12, 28)), date(2024, 12, 21));
        assert_eq!(argo.file_date(date(2024, 12, 28)), date(2024, 12, 28));
    }

    #[test]
    fn file_paths_follow_replicate_policy() {
        let models = default_models();
        let individual = models.iter().find(|m| m.display_name == "LGB-2024-I").unwrap();
        let consolidated = models.iter().find(|m| m.display_name == "LGB-2023-C").unwrap();
        let single = models.iter().find(|m| m.display_name == "ARGO2").unwrap();

        let paths = individual.file_paths(date(2024, 12, 28));
        assert_eq!(paths.len(), 12);
        assert_eq!(paths[0], "lgb_mod2024_individual/lgb_mod2024_h1_1_2024-12-21.csv");
        assert_eq!(paths[11], "lgb_mod2024_individual/lgb_mod2024_h4_3_2024-12-21.csv");

        let paths = consolidated.file_paths(date(2024, 12, 28));
        assert_eq!(paths.len(), 5);
        assert_eq!(paths[4], "lgb_mod2023_consolidated/lgb_mod2023_5_2024-12-21.csv");

        assert_eq!(
            single.file_paths(date(2024, 12, 28)),
            vec!["shihao_team/argo2_raw_2024-12-28.csv".to_string()]
        );
    }

    #[test]
    fn descriptors_deserialize_from_json() {
        let json = r#"{
            "path": "arima/arima",
            "display_name": "ARIMA",
            "format": "arima",
            "replicates": "single",
            "date_offset": "week_prior",
            "prefix": "arima"
        }"#;
        let desc: ModelDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc, default_models()[0]);
    }
}
