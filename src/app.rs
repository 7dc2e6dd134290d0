use std::fs;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use chrono::Utc;
use uuid::Uuid;

use crate::cli::{Cli, Commands};
use crate::client::{Completion, CompletionRequest};
use crate::config::Config;
use crate::core::{ChatRequest, Outcome, Pipeline, PromptSegment, Role};
use crate::error::{CompletionError, PipelineError};
use crate::output::{envelope, output_batch_json, output_status_json};
use crate::utils::{Clock, epoch_string, record_api_success};

const PING_TIMEOUT: Duration = Duration::from_secs(10);
const PING_MAX_TOKENS: u32 = 10;

/// Exit code for requests the caller got wrong (empty message)
const EXIT_CLIENT_ERROR: u8 = 2;

pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) config: &'a Config,
    pub(crate) completion: &'a dyn Completion,
    pub(crate) clock: &'a dyn Clock,
    pub(crate) started: Instant,
}

impl CommandContext<'_> {
    fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(self.config, self.completion, self.clock)
    }
}

/// Minimal round trip used at startup and by `ping`
pub(crate) fn ping(completion: &dyn Completion, config: &Config) -> Result<String, CompletionError> {
    let session_id = Uuid::new_v4().to_string();
    let timestamp = epoch_string(Utc::now());
    let messages = [PromptSegment {
        role: Role::User,
        content: "ping".to_string(),
    }];
    let answer = completion.complete(&CompletionRequest {
        model: &config.model,
        messages: &messages,
        temperature: config.temperature,
        max_tokens: PING_MAX_TOKENS,
        search: None,
        timeout: PING_TIMEOUT,
        session_id: &session_id,
        timestamp: &timestamp,
    })?;
    record_api_success(Utc::now());
    tracing::info!("API connectivity test successful: {}", answer.text);
    Ok(answer.text)
}

fn print_result(result: &Result<Outcome, PipelineError>, json: bool) {
    if json {
        println!("{}", envelope(result));
        return;
    }
    match result {
        Ok(outcome) => println!("{}", outcome.reply),
        Err(e) => {
            eprintln!("{e}");
            println!("{}", e.fallback_text());
        }
    }
}

fn exit_status(result: &Result<Outcome, PipelineError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) if e.is_client_error() => EXIT_CLIENT_ERROR,
        Err(_) => 1,
    }
}

fn handle_ask(message: &str, ctx: &CommandContext<'_>) -> ExitCode {
    let result = ctx.pipeline().handle(&ChatRequest {
        message: message.to_string(),
        nick: ctx.cli.nick.clone(),
    });
    print_result(&result, ctx.cli.json);
    ExitCode::from(exit_status(&result))
}

fn read_messages(input: Option<&std::path::Path>) -> io::Result<Vec<String>> {
    match input {
        Some(path) => Ok(fs::read_to_string(path)?.lines().map(str::to_string).collect()),
        None => io::stdin().lock().lines().collect(),
    }
}

fn handle_batch(input: Option<&std::path::Path>, ctx: &CommandContext<'_>) -> ExitCode {
    let messages = match read_messages(input) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to read messages: {e}");
            return ExitCode::FAILURE;
        }
    };
    let requests: Vec<ChatRequest> = messages
        .into_iter()
        .map(|message| ChatRequest {
            message,
            nick: ctx.cli.nick.clone(),
        })
        .collect();
    tracing::info!("processing {} messages", requests.len());

    let results = ctx.pipeline().handle_batch(&requests);
    if !results.is_empty() {
        println!("{}", output_batch_json(&results));
    }
    ExitCode::SUCCESS
}

fn handle_ping(ctx: &CommandContext<'_>) -> ExitCode {
    match ping(ctx.completion, ctx.config) {
        Ok(reply) => {
            if ctx.cli.json {
                println!("{}", serde_json::json!({ "status": "ok", "reply": reply }));
            } else {
                println!("ok: {reply}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("API connectivity test failed: {e}");
            if ctx.cli.json {
                println!("{}", serde_json::json!({ "status": "error", "error": e.to_string() }));
            } else {
                eprintln!("API connectivity test failed: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Dispatch the parsed command
pub(crate) fn handle_command(ctx: &CommandContext<'_>) -> ExitCode {
    match &ctx.cli.command {
        Commands::Ask { message } => handle_ask(message, ctx),
        Commands::Batch { input } => handle_batch(input.as_deref(), ctx),
        Commands::Ping => handle_ping(ctx),
        Commands::Status => {
            println!("{}", output_status_json(ctx.config, ctx.started.elapsed()));
            ExitCode::SUCCESS
        }
    }
}
