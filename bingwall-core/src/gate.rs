//! Admission checks run before any network or disk work.

use chrono::{DateTime, Duration, Utc};

/// Minimum spacing between unforced metadata requests.
pub const MIN_UPDATE_INTERVAL: Duration = Duration::hours(2);

/// Throttle gate: should an update attempt proceed at all?
///
/// Forced runs (preference changes) always proceed. Unforced runs proceed
/// when there is no usable previous timestamp or it is at least
/// [`MIN_UPDATE_INTERVAL`] old. A timestamp in the future counts as recent.
pub fn should_proceed(
    force: bool,
    last_update: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    if force {
        return true;
    }
    match last_update {
        None => true,
        Some(last) => now.signed_duration_since(last) >= MIN_UPDATE_INTERVAL,
    }
}

/// Change detector: does `materialized_url` differ from what was applied?
pub fn has_changed(materialized_url: &str, last_url: Option<&str>) -> bool {
    last_url != Some(materialized_url)
}
