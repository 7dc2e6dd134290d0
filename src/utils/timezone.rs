use chrono::offset::Offset;
use chrono::{DateTime, FixedOffset, Utc};

/// A display zone picked from hints in the message text.
/// Only one alternate zone (BST) is modeled; everything else is UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NamedZone {
    pub(crate) label: &'static str,
    offset_secs: i32,
}

/// (hints, zone) pairs, checked in order against the lowercased message
const ZONE_HINTS: &[(&[&str], NamedZone)] = &[(&["bst", "uk"], NamedZone::BST)];

impl NamedZone {
    pub(crate) const UTC: NamedZone = NamedZone {
        label: "UTC",
        offset_secs: 0,
    };

    pub(crate) const BST: NamedZone = NamedZone {
        label: "BST",
        offset_secs: 3600,
    };

    pub(crate) fn resolve(text: &str) -> Self {
        let lower = text.to_lowercase();
        ZONE_HINTS
            .iter()
            .find(|(hints, _)| hints.iter().any(|h| lower.contains(h)))
            .map(|(_, zone)| *zone)
            .unwrap_or(Self::UTC)
    }

    pub(crate) fn to_fixed_offset(self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.offset_secs).unwrap_or_else(|| Utc.fix());
        utc.with_timezone(&offset)
    }
}
