//! Wires the loaders, the session state and the chart together.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use crate::app::debounce::Debouncer;
use crate::app::state::{AppState, Event, RequestToken, recent_forecast_dates, reduce};
use crate::config::Settings;
use crate::data::{ForecastLoader, Transport, TruthLoader, transport_for_root};
use crate::domain::ForecastRecord;
use crate::error::AppError;
use crate::plot::ForecastChart;

pub struct Session<T: ?Sized> {
    truth_loader: TruthLoader<T>,
    forecast_loader: ForecastLoader<T>,
    state: AppState,
    chart: ForecastChart,
    resize: Debouncer,
    pending_width: Option<f64>,
    recent_date_count: usize,
}

impl Session<dyn Transport> {
    /// Session over HTTP or the local filesystem, chosen by `data_root`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(transport_for_root(&settings.data_root), settings)
    }
}

impl<T: Transport + ?Sized> Session<T> {
    pub fn new(transport: Arc<T>, settings: &Settings) -> Self {
        Self {
            truth_loader: TruthLoader::new(transport.clone(), settings),
            forecast_loader: ForecastLoader::new(transport, settings),
            state: AppState::default(),
            chart: ForecastChart::default(),
            resize: Debouncer::new(settings.resize_debounce),
            pending_width: None,
            recent_date_count: settings.recent_date_count,
        }
    }

    /// Load ground truth, then the forecasts for the derived latest date.
    pub async fn initialize(&mut self) -> Result<(), AppError> {
        self.reload_truth().await?;
        let Some(as_of) = self.state.selected_date else {
            return Ok(());
        };
        info!(%as_of, "session initialized");
        self.select_date(as_of).await;
        Ok(())
    }

    /// Load the forecasts issued for `as_of` and redraw.
    pub async fn select_date(&mut self, as_of: NaiveDate) {
        let token = self.begin_forecast_request(as_of);
        let records = self.forecast_loader.load_forecasts(as_of).await;
        self.complete_forecast_request(token, records);
    }

    /// Start a forecast request. Any request begun earlier becomes stale.
    pub fn begin_forecast_request(&mut self, as_of: NaiveDate) -> RequestToken {
        self.dispatch(Event::ForecastsRequested { as_of });
        self.state.current_token()
    }

    /// Apply the results of a forecast request. Returns `false` (and changes
    /// nothing) when a newer request has been started since.
    pub fn complete_forecast_request(&mut self, token: RequestToken, records: Vec<ForecastRecord>) -> bool {
        if token != self.state.current_token() {
            debug!(?token, current = ?self.state.current_token(), "discarding stale forecasts");
            return false;
        }
        self.dispatch(Event::ForecastsLoaded { token, records });
        self.redraw();
        true
    }

    /// Switch the ground-truth window and redraw with the current forecasts.
    pub async fn set_retrospective(&mut self, include: bool) -> Result<(), AppError> {
        self.dispatch(Event::RetrospectiveToggled(include));
        self.reload_truth().await?;
        self.redraw();
        Ok(())
    }

    pub fn toggle_model(&mut self, model: &str) {
        self.dispatch(Event::ModelToggled(model.to_string()));
        self.redraw();
    }

    /// Note a viewport resize. The relayout happens once the resize burst has
    /// been quiet for the debounce delay.
    pub fn resize(&mut self, width: f64, now: Instant) {
        self.pending_width = Some(width);
        self.resize.trigger(now);
    }

    /// Apply a pending resize whose delay has elapsed. Returns whether a
    /// relayout ran.
    pub fn poll_resize(&mut self, now: Instant) -> bool {
        if !self.resize.fire_if_due(now) {
            return false;
        }
        let Some(width) = self.pending_width.take() else {
            return false;
        };
        // Failures are logged by the chart, which keeps its previous render.
        let _ = self.chart.update_layout(width);
        true
    }

    /// Wait out a pending resize and apply it.
    pub async fn settle_resize(&mut self) -> bool {
        let Some(deadline) = self.resize.deadline() else {
            return false;
        };
        sleep_until(deadline).await;
        self.poll_resize(deadline)
    }

    /// Selectable as-of dates, newest first.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.state
            .latest_forecast_date
            .map(|latest| recent_forecast_dates(latest, self.recent_date_count))
            .unwrap_or_default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn chart(&self) -> &ForecastChart {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut ForecastChart {
        &mut self.chart
    }

    async fn reload_truth(&mut self) -> Result<(), AppError> {
        match self.truth_loader.load_ground_truth(self.state.include_retrospective).await {
            Ok(truth) => {
                self.dispatch(Event::TruthLoaded(truth));
                Ok(())
            }
            Err(e) => {
                self.dispatch(Event::TruthFailed(e.to_string()));
                Err(e)
            }
        }
    }

    fn dispatch(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, event);
    }

    fn redraw(&mut self) {
        let visible = self.state.visible_forecasts();
        // Failures are logged by the chart, which keeps its previous render.
        let _ = self.chart.update(&self.state.truth, &visible);
    }
}
