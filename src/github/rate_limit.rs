use crate::github::error::FetchError;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Waits until the rate limit resets.
///
/// Returns `true` if `err` is a rate-limit error, after sleeping until its
/// reset time, so the caller can retry the same request. Any other error
/// returns `false` immediately.
pub async fn wait_for_rate_limit_reset(err: &FetchError) -> bool {
    let Some(reset_at) = err.rate_limit_reset() else {
        return false;
    };
    let delta = time_until(reset_at, Utc::now());
    tracing::info!("rate limit hit; sleeping for {delta:?} before retrying");
    if !delta.is_zero() {
        tokio::time::sleep(delta).await;
    }
    true
}

/// Time remaining from `now` until `reset_at`, zero if already passed.
pub fn time_until(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (reset_at - now).to_std().unwrap_or(Duration::ZERO)
}
