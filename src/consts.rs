/// Keywords that mark a message as asking about the current date or time
pub(crate) const TEMPORAL_KEYWORDS: &[&str] = &["time", "date", "today", "now", "yesterday"];

/// Keywords that request live search on the upstream side.
/// Time words are left out on purpose: those are answered locally.
pub(crate) const LIVE_CONTEXT_KEYWORDS: &[&str] =
    &["weather", "death", "died", "recent", "news", "what happened"];

/// Keywords the "today" branch of the fallback answers
pub(crate) const CLOCK_KEYWORDS: &[&str] = &["time", "date", "today", "now"];

/// An upstream date further than this from the reference time is not trusted
pub(crate) const VALIDITY_WINDOW_SECS: f64 = 86_400.0;

/// Rendering used for `{current_time}` in the system prompt: "2025-09-03 16:14:00 UTC"
pub(crate) const PROMPT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub(crate) const DEFAULT_MODEL: &str = "grok-4";

/// Fallback value when the sender nick is not supplied
pub(crate) const UNKNOWN: &str = "unknown";

pub(crate) const MESSAGE_PLACEHOLDER: &str = "{message}";

pub(crate) const NO_MESSAGE_FALLBACK: &str = "Please provide a message!";
pub(crate) const PROMPT_FAILURE_FALLBACK: &str = "Sorry, I couldn't process that!";
pub(crate) const UPSTREAM_FAILURE_FALLBACK: &str = "Sorry, I couldn't connect to Grok!";
