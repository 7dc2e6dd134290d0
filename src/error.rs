use std::path::PathBuf;

use thiserror::Error;

use crate::consts::{NO_MESSAGE_FALLBACK, PROMPT_FAILURE_FALLBACK, UPSTREAM_FAILURE_FALLBACK};

/// Errors raised while loading configuration. All of them are fatal.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("No config file found (tried: {tried})")]
    NotFound { tried: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid system_prompt: must include {{message}}")]
    MissingPlaceholder,

    #[error("XAI_API_KEY not provided in config or environment")]
    MissingApiKey,

    #[error("Invalid {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TemplateError {
    #[error("Invalid timestamp \"{input}\" (expected epoch seconds)")]
    InvalidTimestamp { input: String },

    #[error("Undefined template key '{key}'")]
    UndefinedKey { key: String },

    #[error("Malformed template: {reason}")]
    Malformed { reason: &'static str },
}

/// Failures of the upstream completion call
#[derive(Debug, Error)]
pub(crate) enum CompletionError {
    #[error("request timed out")]
    Timeout,

    #[error("API returned HTTP {status}")]
    Status { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid API response: {0}")]
    Decode(String),

    #[error("API response contained no choices")]
    EmptyChoices,
}

/// Request-scoped failures surfaced to the caller
#[derive(Debug, Error)]
pub(crate) enum PipelineError {
    #[error("No message provided")]
    EmptyMessage,

    #[error("Prompt generation failed: {0}")]
    Prompt(#[from] TemplateError),

    #[error("API call failed: {0}")]
    Upstream(#[from] CompletionError),
}

impl PipelineError {
    /// Apology text shown to the end user alongside the error
    pub(crate) fn fallback_text(&self) -> &'static str {
        match self {
            PipelineError::EmptyMessage => NO_MESSAGE_FALLBACK,
            PipelineError::Prompt(_) => PROMPT_FAILURE_FALLBACK,
            PipelineError::Upstream(_) => UPSTREAM_FAILURE_FALLBACK,
        }
    }

    /// Whether the caller sent a bad request, as opposed to a processing failure
    pub(crate) fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::EmptyMessage)
    }
}
