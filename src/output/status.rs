use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::utils::last_api_success_label;

const RECENT_LOG_LINES: usize = 5;

/// Last few lines of the log file, oldest first
fn recent_logs(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let lines: Vec<&str> = content.lines().collect();
            let start = lines.len().saturating_sub(RECENT_LOG_LINES);
            lines[start..].iter().map(|l| l.to_string()).collect()
        }
        Err(e) => {
            tracing::warn!("failed to read log file {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Diagnostics snapshot: redacted config, uptime, last successful API call,
/// and the log tail when logging to a file
pub(crate) fn output_status_json(config: &Config, uptime: Duration) -> String {
    let mut status = serde_json::json!({
        "config": config.redacted(),
        "uptime": uptime.as_secs_f64(),
        "version": env!("CARGO_PKG_VERSION"),
        "last_api_success": last_api_success_label(),
    });
    if let Some(path) = &config.log_file {
        status["recent_logs"] = serde_json::json!(recent_logs(path));
    }
    serde_json::to_string_pretty(&status).unwrap_or_else(|e| {
        tracing::error!("failed to serialize status: {e}");
        String::from("{}")
    })
}
