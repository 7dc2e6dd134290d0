//! Pull the first recognizable date or time out of free text
//!
//! Patterns are tried in priority order. For each match, every layout is
//! attempted until one parses; if none does, the next pattern gets a turn.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use regex::Regex;

/// Candidate substrings, most specific first
const PATTERNS: &[&str] = &[
    // September 03, 2025
    r"(?i)\b(\w+ \d{1,2}, \d{4})\b",
    // 2025-09-03
    r"(?i)\b(\d{4}-\d{2}-\d{2})\b",
    // 03 September 2025
    r"(?i)\b(\d{1,2} \w+ \d{4})\b",
    // 04:14 PM, or 04:14 followed by a space
    r"(?i)\b(\d{1,2}:\d{2} (?:AM|PM)?)\b",
    // 2023, last resort
    r"(?i)\b(\d{4})\b",
];

#[derive(Debug, Clone, Copy)]
enum Layout {
    /// A full calendar date, read as midnight UTC
    Date(&'static str),
    /// 12-hour clock with AM/PM, placed on the anchor's day
    Clock(&'static str),
    /// Year only, placed on the anchor's month and day
    Year,
}

const LAYOUTS: &[Layout] = &[
    Layout::Date("%B %d, %Y"),
    Layout::Date("%Y-%m-%d"),
    Layout::Date("%d %B %Y"),
    Layout::Clock("%I:%M %p"),
    Layout::Year,
];

static COMPILED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!("invalid date pattern {p}: {e}");
                None
            }
        })
        .collect()
});

impl Layout {
    fn parse(self, s: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Layout::Date(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()?
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc()),
            Layout::Clock(fmt) => {
                let time = NaiveTime::parse_from_str(s, fmt).ok()?;
                Some(anchor.date_naive().and_time(time).and_utc())
            }
            Layout::Year => {
                if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let year: i32 = s.parse().ok()?;
                if year < 1 {
                    return None;
                }
                anchor.with_year(year)
            }
        }
    }
}

/// Find the first date/time mentioned in `text`, normalized to UTC.
///
/// `anchor` supplies the missing parts of partial matches: the day for a
/// clock time, the month and day for a bare year.
pub(crate) fn extract_date(text: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    for re in COMPILED.iter() {
        let Some(found) = re.captures(text).and_then(|c| c.get(1)) else {
            continue;
        };
        let candidate = found.as_str();
        if let Some(parsed) = LAYOUTS.iter().find_map(|l| l.parse(candidate, anchor)) {
            return Some(parsed);
        }
    }
    tracing::debug!("no date parsed from response: {text}");
    None
}
