//! Crate-wide error type.
//!
//! Only file-, collection- and render-level failures are errors. Row-level
//! parse problems are skipped inside the normalizer and never surface here.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// The transport answered with a non-2xx status. Recoverable: the caller
    /// treats the file as contributing zero records.
    #[error("file '{path}' unavailable (status {status})")]
    FileAbsent { path: String, status: u16 },

    /// The transport itself failed (connection, I/O, decoding).
    #[error("fetch of '{path}' failed: {message}")]
    Fetch { path: String, message: String },

    /// No ground-truth observation exists on or after the cutoff date.
    #[error("no ground truth observations on or after {cutoff}")]
    DataUnavailable { cutoff: NaiveDate },

    #[error("render failed: {0}")]
    Render(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    pub fn fetch(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
