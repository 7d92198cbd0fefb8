//! Session state and its pure reducer.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

use crate::data::GroundTruth;
use crate::domain::{ForecastRecord, TruthRecord};

/// Identifies one forecast request. Results carrying an older token than the
/// state's current generation are stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub truth: Vec<TruthRecord>,
    pub forecasts: Vec<ForecastRecord>,
    pub latest_forecast_date: Option<NaiveDate>,
    pub selected_date: Option<NaiveDate>,
    pub selected_models: BTreeSet<String>,
    /// Set once the first forecast load has seeded `selected_models`.
    pub models_seeded: bool,
    pub include_retrospective: bool,
    pub generation: u64,
    pub loading: bool,
    /// User-visible message for the last collection-level failure.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TruthLoaded(GroundTruth),
    TruthFailed(String),
    ForecastsRequested { as_of: NaiveDate },
    ForecastsLoaded { token: RequestToken, records: Vec<ForecastRecord> },
    ModelToggled(String),
    RetrospectiveToggled(bool),
}

impl AppState {
    /// Token for the most recent forecast request.
    pub fn current_token(&self) -> RequestToken {
        RequestToken(self.generation)
    }

    /// Forecasts for the selected models only.
    pub fn visible_forecasts(&self) -> Vec<ForecastRecord> {
        self.forecasts
            .iter()
            .filter(|r| self.selected_models.contains(&r.model))
            .cloned()
            .collect()
    }

    /// Distinct model names in the current forecasts, sorted.
    pub fn available_models(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.forecasts.iter().map(|r| r.model.as_str()).collect();
        names.into_iter().map(str::to_string).collect()
    }
}

pub fn reduce(mut state: AppState, event: Event) -> AppState {
    match event {
        Event::TruthLoaded(truth) => {
            state.truth = truth.records;
            state.latest_forecast_date = Some(truth.latest_forecast_date);
            if state.selected_date.is_none() {
                state.selected_date = Some(truth.latest_forecast_date);
            }
            state.error = None;
        }
        Event::TruthFailed(message) => {
            state.error = Some(message);
        }
        Event::ForecastsRequested { as_of } => {
            state.generation += 1;
            state.selected_date = Some(as_of);
            state.loading = true;
        }
        Event::ForecastsLoaded { token, records } => {
            if token != state.current_token() {
                return state;
            }
            if !state.models_seeded {
                state.selected_models = records.iter().map(|r| r.model.clone()).collect();
                state.models_seeded = true;
            }
            state.forecasts = records;
            state.loading = false;
        }
        Event::ModelToggled(model) => {
            if !state.selected_models.remove(&model) {
                state.selected_models.insert(model);
            }
        }
        Event::RetrospectiveToggled(include) => {
            state.include_retrospective = include;
        }
    }
    state
}

/// The `count` selectable as-of dates: `latest` and the weeks before it,
/// newest first.
pub fn recent_forecast_dates(latest: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (0..count as u64)
        .map_while(|weeks| latest.checked_sub_days(Days::new(7 * weeks)))
        .collect()
}
