use chrono::{DateTime, Utc};

use crate::error::TemplateError;

/// Parse a string-encoded epoch value ("1756916040" or "1756916040.123456")
pub(crate) fn parse_epoch(s: &str) -> Result<DateTime<Utc>, TemplateError> {
    let invalid = || TemplateError::InvalidTimestamp {
        input: s.to_string(),
    };
    let trimmed = s.trim();
    if let Some((secs, nanos)) = split_decimal(trimmed) {
        return DateTime::from_timestamp(secs, nanos).ok_or_else(invalid);
    }

    // Signs and exponents go through f64
    let secs: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !secs.is_finite() {
        return Err(invalid());
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos).ok_or_else(invalid)
}

/// Exact split of plain `digits[.digits]`; fractions beyond nanoseconds are truncated
fn split_decimal(s: &str) -> Option<(i64, u32)> {
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    let (int, frac) = s.split_once('.').unwrap_or((s, ""));
    if int.is_empty() || !all_digits(int) || !all_digits(frac) {
        return None;
    }
    let secs: i64 = int.parse().ok()?;
    let digits = &frac[..frac.len().min(9)];
    let nanos = if digits.is_empty() {
        0
    } else {
        digits.parse::<u32>().ok()? * 10u32.pow(9 - digits.len() as u32)
    };
    Some((secs, nanos))
}

/// Encode an instant the way the pipeline carries it: epoch seconds with microseconds
pub(crate) fn epoch_string(at: DateTime<Utc>) -> String {
    format!("{}.{:06}", at.timestamp(), at.timestamp_subsec_micros())
}

/// Source of "now" for the pipeline
pub(crate) trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant (`--timestamp`, tests)
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
