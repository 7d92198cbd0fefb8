//! Data collection: the fetch seam and the two loaders built on it.

pub mod forecasts;
pub mod transport;
pub mod truth;

pub use forecasts::{ForecastLoader, average_replicates};
pub use transport::{FetchResponse, FileTransport, HttpTransport, Transport, fetch_text, transport_for_root};
pub use truth::{GroundTruth, TruthLoader, latest_forecast_date};
