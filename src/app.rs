//! Interactive session: explicit state, its reducer, and the orchestration
//! that feeds loaded data into the chart.

pub mod debounce;
pub mod session;
pub mod state;

pub use debounce::{Debouncer, debounce_channel};
pub use session::Session;
pub use state::{AppState, Event, RequestToken, recent_forecast_dates, reduce};
