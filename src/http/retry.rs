//! Which index failures are worth another attempt.
//!
//! Transport failures (connect errors, timeouts, dropped connections) and
//! 5xx responses are transient. Any 4xx answer is final.

use std::time::Duration;
use thiserror::Error;

use crate::config::Settings;

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_attempts: settings.max_retries,
            delay: Duration::from_millis(settings.retry_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Failures another attempt would not fix.
#[derive(Debug, Error)]
pub enum NonRetryableError {
    /// The project does not exist on the index (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Any other 4xx answer
    #[error("HTTP {status} from {url}")]
    Rejected { status: u16, url: String },
    /// Successful response with a body that is not the expected JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

fn classify(error: &reqwest::Error) -> Option<NonRetryableError> {
    let status = error.status().filter(|s| s.is_client_error())?;
    let url = error.url().map(|u| u.to_string()).unwrap_or_default();

    Some(match status.as_u16() {
        404 => NonRetryableError::NotFound(url),
        status => NonRetryableError::Rejected { status, url },
    })
}

/// Wraps an error from `error_for_status()`, marking 4xx answers as
/// [`NonRetryableError`] and leaving transient failures as they are.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify(&error) {
        Some(final_error) => anyhow::Error::from(final_error),
        None => anyhow::Error::from(error),
    }
}
