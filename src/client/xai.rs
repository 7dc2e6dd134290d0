use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{PromptSegment, SearchParameters, UpstreamAnswer, Usage};
use crate::error::CompletionError;

use super::{Completion, CompletionRequest};

/// OpenAI-compatible chat completions client for the xAI API
#[derive(Debug, Clone)]
pub(crate) struct XaiClient {
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [PromptSegment],
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_parameters: Option<&'a SearchParameters>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl XaiClient {
    pub(crate) fn new(api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Headers that defeat intermediate caches and tag the call with its session
fn request_headers(request: &CompletionRequest<'_>) -> [(&'static str, String); 4] {
    let nonce = Uuid::new_v4().simple().to_string();
    let request_id = 100_000 + Uuid::new_v4().as_u128() % 900_000;
    [
        (
            "X-Cache-Bypass",
            format!("{}-{}", chrono::Utc::now().timestamp_millis(), &nonce[..16]),
        ),
        ("X-Request-ID", request_id.to_string()),
        ("X-Session-ID", request.session_id.to_string()),
        ("X-Timestamp", request.timestamp.to_string()),
    ]
}

fn map_error(err: ureq::Error) -> CompletionError {
    match err {
        ureq::Error::StatusCode(status) => CompletionError::Status { status },
        ureq::Error::Timeout(_) => CompletionError::Timeout,
        other => CompletionError::Transport(other.to_string()),
    }
}

impl Completion for XaiClient {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<UpstreamAnswer, CompletionError> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(request.timeout))
            .build()
            .into();

        let body = ChatBody {
            model: request.model,
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            search_parameters: request.search,
        };

        let mut call = agent
            .post(&self.endpoint())
            .header("Authorization", &format!("Bearer {}", self.api_key));
        let headers = request_headers(request);
        tracing::debug!(session_id = request.session_id, ?headers, "request headers");
        for (name, value) in &headers {
            call = call.header(*name, value);
        }

        let mut response = call.send_json(&body).map_err(map_error)?;
        let parsed: ChatResponse = response.body_mut().read_json().map_err(|e| match e {
            ureq::Error::Timeout(_) => CompletionError::Timeout,
            other => CompletionError::Decode(other.to_string()),
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyChoices)?;
        Ok(UpstreamAnswer {
            text: choice.message.content.unwrap_or_default(),
            usage: parsed.usage,
        })
    }
}
