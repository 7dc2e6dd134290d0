//! Keyword classification of incoming messages

use crate::consts::{LIVE_CONTEXT_KEYWORDS, TEMPORAL_KEYWORDS};

use super::types::Classification;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Decide whether a message needs live search and whether it is about the
/// current date/time. The search cap is attached later by the pipeline.
pub(crate) fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();
    Classification {
        needs_live_context: contains_any(&lower, LIVE_CONTEXT_KEYWORDS),
        is_temporal: contains_any(&lower, TEMPORAL_KEYWORDS),
        search: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporal_keywords() {
        for msg in [
            "what time is it",
            "What's the DATE",
            "anything good today?",
            "right now",
            "what was yesterday",
        ] {
            assert!(classify(msg).is_temporal, "{msg}");
        }
    }

    #[test]
    fn live_context_keywords() {
        for msg in [
            "weather in leeds",
            "who DIED this week",
            "any recent news",
            "what happened in the match",
            "cause of death",
        ] {
            assert!(classify(msg).needs_live_context, "{msg}");
        }
    }

    #[test]
    fn time_words_do_not_request_live_search() {
        let c = classify("what's the date today");
        assert!(c.is_temporal);
        assert!(!c.needs_live_context);
    }

    #[test]
    fn plain_message_has_no_flags() {
        let c = classify("tell me a joke");
        assert!(!c.is_temporal);
        assert!(!c.needs_live_context);
        assert_eq!(c.search, None);
    }

    #[test]
    fn substring_matching_is_literal() {
        // "sometimes" contains "time"; matching is plain substring.
        assert!(classify("sometimes I wonder").is_temporal);
    }

    #[test]
    fn classification_is_deterministic() {
        let msg = "weather today in the uk";
        assert_eq!(classify(msg), classify(msg));
        assert!(classify(msg).is_temporal);
    }
}
