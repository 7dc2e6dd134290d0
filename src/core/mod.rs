//! Query interpretation and response validation
//!
//! Pure stages (classification, prompt, extraction, validation, fallback)
//! wired together by [`Pipeline`].

mod extract;
mod fallback;
mod intent;
mod pipeline;
mod prompt;
mod types;
mod validate;

pub(crate) use pipeline::{ChatRequest, Pipeline};
pub(crate) use types::{
    Outcome, PromptSegment, ReplySource, Role, SearchParameters, UpstreamAnswer, Usage,
};
