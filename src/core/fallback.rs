//! Deterministic local answers for date/time questions

use chrono::Duration;

use crate::consts::CLOCK_KEYWORDS;
use crate::utils::{NamedZone, parse_epoch};

/// Answer a date/time question from the reference timestamp alone.
///
/// Returns `None` when the query matches neither the "yesterday" nor the
/// "today" phrasing, or when the timestamp cannot be decoded.
pub(crate) fn fallback_answer(query: &str, timestamp: &str) -> Option<String> {
    let current = match parse_epoch(timestamp) {
        Ok(dt) => dt,
        Err(e) => {
            tracing::error!("time fallback failed: {e}");
            return None;
        }
    };
    let lower = query.to_lowercase();
    let zone = NamedZone::resolve(&lower);

    if lower.contains("yesterday") {
        let yesterday = current.checked_sub_signed(Duration::days(1))?;
        return Some(format!(
            "Yesterday was {}, in {}.",
            yesterday.format("%A, %B %d, %Y"),
            zone.label
        ));
    }

    if CLOCK_KEYWORDS.iter().any(|k| lower.contains(k)) {
        let local = zone.to_fixed_offset(current);
        return Some(format!(
            "It's {} {} on {}.",
            local.format("%I:%M %p"),
            zone.label,
            local.format("%A, %B %d, %Y")
        ));
    }

    None
}
