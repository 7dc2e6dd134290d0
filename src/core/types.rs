//! Core data types shared by the pipeline stages
//!
//! Everything here is built once per request and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::consts::MESSAGE_PLACEHOLDER;

/// One incoming chat message with its request-scoped identity
#[derive(Debug, Clone)]
pub(crate) struct Query {
    pub(crate) text: String,
    pub(crate) nick: String,
    pub(crate) session_id: String,
    /// Reference time as string-encoded epoch seconds
    pub(crate) timestamp: String,
}

/// Live search request forwarded to the upstream as `search_parameters`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SearchParameters {
    pub(crate) mode: &'static str,
    pub(crate) max_search_results: u32,
}

impl SearchParameters {
    pub(crate) fn on(max_search_results: u32) -> Self {
        Self {
            mode: "on",
            max_search_results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Classification {
    pub(crate) needs_live_context: bool,
    pub(crate) is_temporal: bool,
    pub(crate) search: Option<SearchParameters>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct PromptSegment {
    pub(crate) role: Role,
    pub(crate) content: String,
}

/// System instructions followed by the user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Prompt {
    pub(crate) segments: [PromptSegment; 2],
}

impl Prompt {
    /// Fill the user turn's `{message}` placeholder with the query text
    pub(crate) fn with_message(mut self, message: &str) -> Self {
        let user = &mut self.segments[1];
        user.content = user.content.replace(MESSAGE_PLACEHOLDER, message);
        self
    }

    pub(crate) fn segments(&self) -> &[PromptSegment] {
        &self.segments
    }
}

/// Token accounting reported by the upstream
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Usage {
    #[serde(default)]
    pub(crate) prompt_tokens: u64,
    #[serde(default)]
    pub(crate) completion_tokens: u64,
    #[serde(default)]
    pub(crate) total_tokens: u64,
    #[serde(default)]
    pub(crate) num_sources_used: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UpstreamAnswer {
    pub(crate) text: String,
    pub(crate) usage: Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectReason {
    NoDateParsed,
    InvalidDate,
    EmptyOrUnavailable,
    WrongYear,
}

impl RejectReason {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            RejectReason::NoDateParsed => "no-date-parsed",
            RejectReason::InvalidDate => "invalid-date",
            RejectReason::EmptyOrUnavailable => "empty-or-unavailable",
            RejectReason::WrongYear => "wrong-year",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Trusted,
    Rejected(RejectReason),
}

/// Why a locally computed answer replaced the upstream one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FallbackReason {
    ApiFailure,
    Rejected(RejectReason),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::ApiFailure => f.write_str("api-failure"),
            FallbackReason::Rejected(reason) => f.write_str(reason.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplySource {
    /// Message was in the ignore list; no upstream call was made
    Ignored,
    Upstream,
    Fallback(FallbackReason),
}

/// The single reply produced for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) reply: String,
    pub(crate) source: ReplySource,
    pub(crate) session_id: String,
    pub(crate) timestamp: String,
}
