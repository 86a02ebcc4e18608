//! Compact protocol (§4.4): spawns the external AI CLI in one-shot mode,
//! feeds it a structured summarization prompt over stdin, and parses its
//! JSON stdout. Cancellable; on cancellation the child's stdin is dropped
//! and no partial summary is ever committed.

use std::time::Duration;

use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use octave_error::Error;
use octave_protocol::{Message, Role};

use crate::extraction::extract_context;
use crate::selection::{SelectionResult, SmartSelectionParams, smart_select};
use crate::tokens::{calculate_tokens, tokenize_count};

const TRUNCATE_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub struct CompactSettings {
    /// Path or `PATH`-resolved name of the external AI CLI binary
    /// (`OCTAVE_COMPACT_CLI`).
    pub cli_command: String,
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for CompactSettings {
    fn default() -> Self {
        Self {
            cli_command: "claude".to_string(),
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompactOutcome {
    pub summary: String,
    pub kept: Vec<Message>,
    pub summarized_count: usize,
    pub tokens_before: i64,
    pub tokens_after: i64,
}

#[derive(Deserialize)]
struct CliResponse {
    text: String,
}

/// Runs smart selection, then asks the AI CLI to summarize the to-summarize
/// set, retrying non-zero exit / stderr failure / JSON parse failure with
/// exponential backoff up to `settings.max_attempts`. Cancelling `cancel`
/// aborts the in-flight attempt and surfaces `Error::Cancelled`.
pub async fn compact(
    settings: &CompactSettings,
    messages: &[Message],
    params: SmartSelectionParams,
    cancel: &CancellationToken,
) -> Result<CompactOutcome, Error> {
    let tokens_before = calculate_tokens(messages).current;
    let selection = smart_select(messages, params)?;
    let prompt = build_prompt(&selection);

    let mut backoff = settings.base_backoff;
    let mut last_err = None;

    for attempt in 1..=settings.max_attempts {
        let summary = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            result = run_once(&settings.cli_command, &prompt) => result,
        };

        match summary {
            Ok(summary) => {
                let kept_tokens: i64 = selection.kept.iter().map(|m| tokenize_count(&m.content)).sum();
                let tokens_after = tokenize_count(&summary) + kept_tokens;
                return Ok(CompactOutcome {
                    summary,
                    summarized_count: selection.to_summarize.len(),
                    kept: selection.kept,
                    tokens_before,
                    tokens_after,
                });
            }
            Err(err) => {
                tracing::warn!(attempt, max_attempts = settings.max_attempts, %err, "compact attempt failed");
                last_err = Some(err);
                if attempt < settings.max_attempts {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(Error::Cancelled),
                        () = tokio::time::sleep(backoff) => {}
                    }
                    backoff *= 2;
                }
            }
        }
    }

    Err(last_err.unwrap_or(Error::ModelError {
        message: "compact attempts exhausted".to_string(),
    }))
}

fn build_prompt(selection: &SelectionResult) -> String {
    let mut context_lines = Vec::new();
    for message in &selection.to_summarize {
        let extracted = extract_context(&message.content);
        context_lines.extend(extracted.file_paths);
        context_lines.extend(extracted.identifiers);
    }
    context_lines.sort();
    context_lines.dedup();

    let mut body = String::new();
    for (i, message) in selection.to_summarize.iter().enumerate() {
        let content = truncate(&message.content, TRUNCATE_CHARS);
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        body.push_str(&format!(
            "{}. [{}] ({role}): {content}\n",
            i + 1,
            message.timestamp,
        ));
    }

    format!(
        "Summarize the following conversation segment into a single compact message. \
         Preserve these referenced identifiers and file paths verbatim where relevant: {}.\n\n{}",
        context_lines.join(", "),
        body
    )
}

fn truncate(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let mut truncated: String = content.chars().take(max_chars).collect();
    truncated.push_str("[truncated]");
    truncated
}

async fn run_once(cli_command: &str, prompt: &str) -> Result<String, Error> {
    let mut child = Command::new(cli_command)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|_| Error::ToolServerUnavailable {
            server_id: cli_command.to_string(),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(prompt.as_bytes()).await.map_err(|e| Error::ModelError {
            message: format!("failed to write compact prompt to child stdin: {e}"),
        })?;
    }

    let output = child.wait_with_output().await.map_err(|e| Error::ModelError {
        message: format!("failed waiting on compact CLI child process: {e}"),
    })?;
    if !output.status.success() {
        return Err(Error::ModelError {
            message: format!(
                "compact CLI exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let response: CliResponse = serde_json::from_str(stdout.trim()).map_err(|e| Error::ParseError {
        message: format!("compact CLI response was not valid JSON: {e}"),
    })?;
    Ok(response.text)
}

#[cfg(test)]
#[path = "compact.test.rs"]
mod tests;
