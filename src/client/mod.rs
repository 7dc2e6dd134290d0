//! Upstream completion API
//!
//! The pipeline only sees the [`Completion`] trait; `XaiClient` is the HTTP
//! implementation used by the binary.

mod xai;

use std::time::Duration;

use crate::core::{PromptSegment, SearchParameters, UpstreamAnswer};
use crate::error::CompletionError;

pub(crate) use xai::XaiClient;

/// Everything one completion call needs
#[derive(Debug, Clone)]
pub(crate) struct CompletionRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: &'a [PromptSegment],
    pub(crate) temperature: f64,
    pub(crate) max_tokens: u32,
    pub(crate) search: Option<&'a SearchParameters>,
    pub(crate) timeout: Duration,
    pub(crate) session_id: &'a str,
    pub(crate) timestamp: &'a str,
}

/// A blocking chat-completion backend
pub(crate) trait Completion: Send + Sync {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<UpstreamAnswer, CompletionError>;
}
