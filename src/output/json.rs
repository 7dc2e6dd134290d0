use crate::core::{Outcome, ReplySource};
use crate::error::PipelineError;
use crate::utils::last_api_success_label;

fn source_label(source: ReplySource) -> String {
    match source {
        ReplySource::Ignored => "ignored".to_string(),
        ReplySource::Upstream => "upstream".to_string(),
        ReplySource::Fallback(reason) => format!("fallback:{reason}"),
    }
}

/// The response envelope: `{"reply": ...}` on success,
/// `{"error": ..., "fallback": ...}` on failure. Both carry `last_api_success`.
pub(crate) fn envelope(result: &Result<Outcome, PipelineError>) -> serde_json::Value {
    let last_success = last_api_success_label();
    match result {
        Ok(outcome) => serde_json::json!({
            "reply": outcome.reply,
            "session_id": outcome.session_id,
            "timestamp": outcome.timestamp,
            "source": source_label(outcome.source),
            "last_api_success": last_success,
        }),
        Err(e) => serde_json::json!({
            "error": e.to_string(),
            "fallback": e.fallback_text(),
            "last_api_success": last_success,
        }),
    }
}

/// One compact JSON line per result, for batch output
pub(crate) fn output_batch_json(results: &[Result<Outcome, PipelineError>]) -> String {
    results
        .iter()
        .map(|r| envelope(r).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
