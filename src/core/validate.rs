//! Temporal plausibility check for upstream answers

use chrono::{DateTime, Utc};

use crate::consts::VALIDITY_WINDOW_SECS;

use super::extract::extract_date;
use super::types::{RejectReason, Verdict};

/// Judge whether an answer to a date/time question can be trusted.
///
/// The answer must mention a date within [`VALIDITY_WINDOW_SECS`] of
/// `reference`. Independently of that, an empty answer, one that says
/// "unavailable", or one that mentions a known-stale year is rejected.
pub(crate) fn validate(
    answer: &str,
    reference: DateTime<Utc>,
    anchor: DateTime<Utc>,
    stale_years: &[String],
) -> Verdict {
    let parsed = extract_date(answer, anchor);
    let time_diff = parsed.map(|p| (reference - p).num_milliseconds().abs() as f64 / 1000.0);
    let in_window = time_diff.is_some_and(|d| d < VALIDITY_WINDOW_SECS);
    tracing::debug!(
        parsed_date = ?parsed,
        time_diff = ?time_diff,
        valid = in_window,
        "time query validation"
    );

    let empty_or_unavailable =
        answer.is_empty() || answer.to_lowercase().contains("unavailable");
    let stale_year = stale_years
        .iter()
        .any(|y| !y.is_empty() && answer.contains(y.as_str()));

    if in_window && !empty_or_unavailable && !stale_year {
        return Verdict::Trusted;
    }

    let reason = if stale_year {
        RejectReason::WrongYear
    } else if parsed.is_none() {
        RejectReason::NoDateParsed
    } else if !in_window {
        RejectReason::InvalidDate
    } else {
        RejectReason::EmptyOrUnavailable
    };
    Verdict::Rejected(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> DateTime<Utc> {
        "2025-09-03T16:14:00Z".parse().unwrap()
    }

    fn stale() -> Vec<String> {
        vec!["2023".to_string()]
    }

    fn check(answer: &str) -> Verdict {
        validate(answer, reference(), reference(), &stale())
    }

    #[test]
    fn accepts_same_day_answer() {
        assert_eq!(
            check("It's 04:14 PM UTC on Wednesday, September 03, 2025."),
            Verdict::Trusted
        );
    }

    #[test]
    fn accepts_clock_time_on_anchor_day() {
        assert_eq!(check("It is 4:10 PM."), Verdict::Trusted);
    }

    #[test]
    fn rejects_missing_date() {
        assert_eq!(
            check("I can't tell the time."),
            Verdict::Rejected(RejectReason::NoDateParsed)
        );
    }

    #[test]
    fn rejects_date_outside_window() {
        assert_eq!(
            check("Today is September 01, 2025."),
            Verdict::Rejected(RejectReason::InvalidDate)
        );
    }

    #[test]
    fn window_boundary_is_exclusive() {
        // Midnight 2025-09-02 is 40h14m before the reference.
        assert_eq!(
            check("2025-09-02"),
            Verdict::Rejected(RejectReason::InvalidDate)
        );
        let reference: DateTime<Utc> = "2025-09-04T00:00:00Z".parse().unwrap();
        assert_eq!(
            validate("2025-09-03", reference, reference, &stale()),
            Verdict::Rejected(RejectReason::InvalidDate)
        );
        let reference: DateTime<Utc> = "2025-09-03T23:59:59Z".parse().unwrap();
        assert_eq!(
            validate("2025-09-03", reference, reference, &stale()),
            Verdict::Trusted
        );
    }

    #[test]
    fn rejects_stale_year_even_when_parsed_date_is_close() {
        // The year check applies regardless of where the parsed date lands.
        assert_eq!(
            check("The year is 2023."),
            Verdict::Rejected(RejectReason::WrongYear)
        );
        assert_eq!(
            check("September 03, 2025 (data as of 2023)"),
            Verdict::Rejected(RejectReason::WrongYear)
        );
    }

    #[test]
    fn rejects_unavailable_answers() {
        assert_eq!(
            check("Current time UNAVAILABLE; last known 2025-09-03"),
            Verdict::Rejected(RejectReason::EmptyOrUnavailable)
        );
    }

    #[test]
    fn empty_answer_reports_missing_date() {
        assert_eq!(check(""), Verdict::Rejected(RejectReason::NoDateParsed));
    }

    #[test]
    fn stale_years_are_configurable() {
        let years = vec!["2024".to_string()];
        assert_eq!(
            validate("The year is 2023.", reference(), reference(), &years),
            Verdict::Rejected(RejectReason::InvalidDate)
        );
        assert_eq!(
            validate("It's 2024 still", reference(), reference(), &years),
            Verdict::Rejected(RejectReason::WrongYear)
        );
        assert_eq!(
            validate("September 03, 2025", reference(), reference(), &[]),
            Verdict::Trusted
        );
    }
}
