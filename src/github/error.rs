//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned by a single page request against the GitHub API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API rate limit exceeded; resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Reset time of the exhausted quota, if this is a rate-limit error.
    pub fn rate_limit_reset(&self) -> Option<DateTime<Utc>> {
        match self {
            FetchError::RateLimited { reset_at } => Some(*reset_at),
            _ => None,
        }
    }
}
