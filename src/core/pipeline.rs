//! Request orchestration
//!
//! `Start -> Classified -> Dispatched -> {Validated, Failed} -> Resolved`.
//! Every request ends with exactly one reply or one error; the only I/O is
//! the single completion call.

use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::client::{Completion, CompletionRequest};
use crate::config::Config;
use crate::error::PipelineError;
use crate::utils::{Clock, epoch_string, record_api_success};

use super::fallback::fallback_answer;
use super::intent::classify;
use super::prompt::{PromptSettings, build_prompt};
use super::types::{
    Classification, FallbackReason, Outcome, Query, ReplySource, SearchParameters,
    UpstreamAnswer, Verdict,
};
use super::validate::validate;

/// Raw intake from the caller
#[derive(Debug, Clone)]
pub(crate) struct ChatRequest {
    pub(crate) message: String,
    pub(crate) nick: String,
}

pub(crate) struct Pipeline<'a> {
    config: &'a Config,
    completion: &'a dyn Completion,
    clock: &'a dyn Clock,
}

impl<'a> Pipeline<'a> {
    pub(crate) fn new(config: &'a Config, completion: &'a dyn Completion, clock: &'a dyn Clock) -> Self {
        Self {
            config,
            completion,
            clock,
        }
    }

    pub(crate) fn handle(&self, request: &ChatRequest) -> Result<Outcome, PipelineError> {
        let started = Instant::now();
        let reference = self.clock.now();
        let query = Query {
            text: request.message.clone(),
            nick: request.nick.clone(),
            session_id: Uuid::new_v4().to_string(),
            timestamp: epoch_string(reference),
        };
        let span = tracing::info_span!(
            "chat",
            session_id = %query.session_id,
            timestamp = %query.timestamp
        );
        let _guard = span.enter();

        if query.text.trim().is_empty() {
            tracing::error!("no message provided");
            return Err(PipelineError::EmptyMessage);
        }

        if self.config.is_ignored(&query.text) {
            tracing::info!(
                nick = %query.nick,
                message = %query.text,
                "ignored non-substantive input"
            );
            return Ok(outcome(&query, String::new(), ReplySource::Ignored));
        }

        tracing::info!(nick = %query.nick, message = %query.text, "request received");

        let mut classification = classify(&query.text);
        let prompt = build_prompt(
            &query.session_id,
            &query.timestamp,
            &PromptSettings {
                template: &self.config.system_prompt,
                max_tokens: self.config.max_tokens,
                ignore_inputs: &self.config.ignore_inputs,
            },
        )
        .inspect_err(|e| tracing::error!("prompt generation failed: {e}"))?
        .with_message(&query.text);

        if classification.needs_live_context {
            classification.search = Some(SearchParameters::on(self.config.max_search_results));
            tracing::info!(message = %query.text, "live search enabled");
        }

        let call = CompletionRequest {
            model: &self.config.model,
            messages: prompt.segments(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            search: classification.search.as_ref(),
            timeout: self.config.timeout(),
            session_id: &query.session_id,
            timestamp: &query.timestamp,
        };
        if let Ok(json) = serde_json::to_string(prompt.segments()) {
            tracing::debug!("API request: {json}");
        }

        let api_start = Instant::now();
        let answer = match self.completion.complete(&call) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("API call failed: {e}");
                if classification.is_temporal
                    && let Some(fallback) = fallback_answer(&query.text, &query.timestamp)
                {
                    tracing::info!(reason = "api-failure", "used fallback for time query: {fallback}");
                    return Ok(outcome(
                        &query,
                        fallback,
                        ReplySource::Fallback(FallbackReason::ApiFailure),
                    ));
                }
                return Err(e.into());
            }
        };

        record_api_success(Utc::now());
        tracing::debug!(
            elapsed_ms = api_start.elapsed().as_millis() as u64,
            sources_used = ?answer.usage.num_sources_used,
            "raw response: {}",
            answer.text
        );

        let (reply, source) = self.resolve(&query, &classification, reference, answer);
        let reply_hash = hex::encode(Sha256::digest(reply.as_bytes()));
        tracing::info!(
            length = reply.len(),
            hash = %reply_hash,
            total_ms = started.elapsed().as_millis() as u64,
            "reply: {reply}"
        );
        Ok(outcome(&query, reply, source))
    }

    /// Handle independent requests concurrently; results keep input order
    pub(crate) fn handle_batch(&self, requests: &[ChatRequest]) -> Vec<Result<Outcome, PipelineError>> {
        requests.par_iter().map(|r| self.handle(r)).collect()
    }

    /// Pick between the upstream text and the local fallback
    fn resolve(
        &self,
        query: &Query,
        classification: &Classification,
        reference: DateTime<Utc>,
        answer: UpstreamAnswer,
    ) -> (String, ReplySource) {
        let reply = answer.text.trim().replace("\\n", "\n");
        tracing::debug!(usage = ?answer.usage, "processing response: {reply}");

        if classification.is_temporal {
            let verdict = validate(
                &reply,
                reference,
                self.clock.now(),
                &self.config.stale_year_markers,
            );
            if let Verdict::Rejected(reason) = verdict {
                match fallback_answer(&query.text, &query.timestamp) {
                    Some(fallback) => {
                        tracing::info!(%reason, "used fallback for time query: {fallback}");
                        return (
                            fallback,
                            ReplySource::Fallback(FallbackReason::Rejected(reason)),
                        );
                    }
                    None => {
                        tracing::warn!(%reason, "answer rejected but no fallback applies, passing through");
                    }
                }
            }
        }

        if query.text.to_lowercase().contains("weather")
            && reply.contains("Unable to get real time results")
        {
            tracing::info!("weather lookup failed upstream: {reply}");
        }

        (reply, ReplySource::Upstream)
    }
}

fn outcome(query: &Query, reply: String, source: ReplySource) -> Outcome {
    Outcome {
        reply,
        source,
        session_id: query.session_id.clone(),
        timestamp: query.timestamp.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::test_config;
    use crate::core::types::{RejectReason, Usage};
    use crate::error::{CompletionError, TemplateError};
    use crate::utils::{FixedClock, parse_epoch};

    /// Canned upstream that records what it was asked
    struct StubCompletion {
        reply: Option<String>,
        calls: AtomicUsize,
        last_search: Mutex<Option<SearchParameters>>,
        last_user_turn: Mutex<Option<String>>,
    }

    impl StubCompletion {
        fn answering(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_search: Mutex::new(None),
                last_user_turn: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                ..Self::answering("")
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Completion for StubCompletion {
        fn complete(&self, request: &CompletionRequest<'_>) -> Result<UpstreamAnswer, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_search.lock().unwrap() = request.search.cloned();
            *self.last_user_turn.lock().unwrap() = request.messages.last().map(|m| m.content.clone());
            match &self.reply {
                Some(text) => Ok(UpstreamAnswer {
                    text: text.clone(),
                    usage: Usage::default(),
                }),
                None => Err(CompletionError::Transport("connection refused".to_string())),
            }
        }
    }

    // 2025-09-03T16:14:00Z
    fn clock() -> FixedClock {
        FixedClock(parse_epoch("1756916040").unwrap())
    }

    fn ask(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            nick: "tester".to_string(),
        }
    }

    fn run(stub: &StubCompletion, message: &str) -> Result<Outcome, PipelineError> {
        let config = test_config();
        let clock = clock();
        Pipeline::new(&config, stub, &clock).handle(&ask(message))
    }

    #[test]
    fn empty_message_is_refused_before_upstream() {
        let stub = StubCompletion::answering("unused");
        assert!(matches!(run(&stub, ""), Err(PipelineError::EmptyMessage)));
        assert!(matches!(run(&stub, "   "), Err(PipelineError::EmptyMessage)));
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn ignored_inputs_get_empty_reply() {
        let stub = StubCompletion::answering("unused");
        for msg in ["lol", " BRB ", "thanks"] {
            let out = run(&stub, msg).unwrap();
            assert_eq!(out.reply, "");
            assert_eq!(out.source, ReplySource::Ignored);
        }
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn non_temporal_answer_returned_verbatim() {
        let stub = StubCompletion::answering("Why did the chicken cross the road?");
        let out = run(&stub, "tell me a joke").unwrap();
        assert_eq!(out.reply, "Why did the chicken cross the road?");
        assert_eq!(out.source, ReplySource::Upstream);
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn non_temporal_answer_is_trimmed_and_unescaped() {
        // Mentions 2023 and has no date, but is never validated.
        let stub = StubCompletion::answering("  line one\\nline two (since 2023)\n ");
        let out = run(&stub, "tell me a joke").unwrap();
        assert_eq!(out.reply, "line one\nline two (since 2023)");
        assert_eq!(out.source, ReplySource::Upstream);
    }

    #[test]
    fn trusted_temporal_answer_passes() {
        let stub = StubCompletion::answering("It's 4:14 PM on September 03, 2025.");
        let out = run(&stub, "what's the date today").unwrap();
        assert_eq!(out.reply, "It's 4:14 PM on September 03, 2025.");
        assert_eq!(out.source, ReplySource::Upstream);
    }

    #[test]
    fn temporal_answer_without_date_uses_fallback() {
        let stub = StubCompletion::answering("I don't have access to a clock.");
        let out = run(&stub, "what's the date today").unwrap();
        assert_eq!(out.reply, "It's 04:14 PM UTC on Wednesday, September 03, 2025.");
        assert_eq!(
            out.source,
            ReplySource::Fallback(FallbackReason::Rejected(RejectReason::NoDateParsed))
        );
    }

    #[test]
    fn stale_year_answer_is_replaced() {
        let stub = StubCompletion::answering("The year is 2023.");
        let out = run(&stub, "what year is it now").unwrap();
        assert_eq!(out.reply, "It's 04:14 PM UTC on Wednesday, September 03, 2025.");
        assert_eq!(
            out.source,
            ReplySource::Fallback(FallbackReason::Rejected(RejectReason::WrongYear))
        );
    }

    #[test]
    fn api_failure_on_temporal_query_uses_fallback() {
        let stub = StubCompletion::failing();
        let out = run(&stub, "yesterday's date uk").unwrap();
        assert_eq!(out.reply, "Yesterday was Tuesday, September 02, 2025, in BST.");
        assert_eq!(out.source, ReplySource::Fallback(FallbackReason::ApiFailure));
    }

    #[test]
    fn api_failure_on_other_query_is_error() {
        let stub = StubCompletion::failing();
        let err = run(&stub, "tell me a joke").unwrap_err();
        assert!(matches!(err, PipelineError::Upstream(_)));
        assert_eq!(err.fallback_text(), "Sorry, I couldn't connect to Grok!");
    }

    #[test]
    fn live_search_requested_for_news() {
        let stub = StubCompletion::answering("Nothing much.");
        run(&stub, "any recent news?").unwrap();
        assert_eq!(
            *stub.last_search.lock().unwrap(),
            Some(SearchParameters::on(5))
        );

        run(&stub, "tell me a joke").unwrap();
        assert_eq!(*stub.last_search.lock().unwrap(), None);
    }

    #[test]
    fn user_turn_carries_message() {
        let stub = StubCompletion::answering("ok");
        run(&stub, "say {hi}").unwrap();
        assert_eq!(stub.last_user_turn.lock().unwrap().as_deref(), Some("say {hi}"));
    }

    #[test]
    fn bad_template_fails_before_upstream() {
        let mut config = test_config();
        config.system_prompt = "Hi {nick}, {message}".to_string();
        let stub = StubCompletion::answering("unused");
        let clock = clock();
        let err = Pipeline::new(&config, &stub, &clock)
            .handle(&ask("tell me a joke"))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Prompt(TemplateError::UndefinedKey { .. })
        ));
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn outcome_carries_request_identity() {
        let stub = StubCompletion::answering("ok");
        let out = run(&stub, "hello there").unwrap();
        assert_eq!(out.timestamp, "1756916040.000000");
        assert!(Uuid::parse_str(&out.session_id).is_ok());
    }

    #[test]
    fn batch_keeps_input_order() {
        let config = test_config();
        let stub = StubCompletion::failing();
        let clock = clock();
        let pipeline = Pipeline::new(&config, &stub, &clock);
        let requests = vec![ask("time now"), ask(""), ask("lol"), ask("tell me a joke")];

        let results = pipeline.handle_batch(&requests);
        assert_eq!(results.len(), 4);
        assert_eq!(
            results[0].as_ref().unwrap().reply,
            "It's 04:14 PM UTC on Wednesday, September 03, 2025."
        );
        assert!(matches!(results[1], Err(PipelineError::EmptyMessage)));
        assert_eq!(results[2].as_ref().unwrap().source, ReplySource::Ignored);
        assert!(matches!(results[3], Err(PipelineError::Upstream(_))));
        assert_eq!(stub.calls(), 2);
    }
}
