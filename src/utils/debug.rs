use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

const UNSET: i64 = i64::MIN;

/// Epoch millis of the last successful upstream call. Advisory only:
/// concurrent writers race and the last one wins.
static LAST_API_SUCCESS: AtomicI64 = AtomicI64::new(UNSET);

pub(crate) fn record_api_success(at: DateTime<Utc>) {
    LAST_API_SUCCESS.store(at.timestamp_millis(), Ordering::Relaxed);
}

pub(crate) fn last_api_success() -> Option<DateTime<Utc>> {
    match LAST_API_SUCCESS.load(Ordering::Relaxed) {
        UNSET => None,
        millis => DateTime::from_timestamp_millis(millis),
    }
}

/// RFC 3339 time of the last success, or "Never"
pub(crate) fn last_api_success_label() -> String {
    last_api_success()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "Never".to_string())
}
