//! Line-oriented command loop: tokenize, parse, dispatch, render.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::dispatch::{BrowserController, DispatchResult, Dispatcher};
use crate::errors::ConsoleError;
use crate::intent::Intent;
use crate::parser::parse_line;
use crate::session::SessionState;
use crate::types::OutputFormat;

pub const PROMPT: &str = "> ";

/// Counts of executed commands
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, result: &DispatchResult) {
        if result.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Where lines come from changes how the loop presents itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Prompt before every line
    Interactive,
    /// Echo each command, skip blanks and `#` comments, finish with a summary
    Batch,
}

pub struct Console<C> {
    dispatcher: Dispatcher<C>,
    format: OutputFormat,
    stop_on_error: bool,
}

impl<C: BrowserController> Console<C> {
    pub fn new(controller: C, format: OutputFormat) -> Self {
        Self {
            dispatcher: Dispatcher::new(controller),
            format,
            stop_on_error: false,
        }
    }

    /// Stop a batch at its first failed command
    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub fn state(&self) -> &SessionState {
        self.dispatcher.state()
    }

    /// Run one raw line. The flag is set when the line asked to leave the loop.
    pub async fn execute_line(&mut self, line: &str) -> Result<(DispatchResult, bool), ConsoleError> {
        let intent = match parse_line(line) {
            Ok(intent) => intent,
            Err(e) => return Ok((DispatchResult::fail(e.message()), false)),
        };

        debug!("Dispatching {}", intent.verb());
        let result = self.dispatcher.dispatch(&intent).await?;
        Ok((result, intent == Intent::Exit))
    }

    pub async fn run<R, W>(
        &mut self,
        reader: R,
        writer: &mut W,
        mode: Mode,
    ) -> Result<RunSummary, ConsoleError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut summary = RunSummary::default();

        loop {
            if mode == Mode::Interactive {
                writer.write_all(PROMPT.as_bytes()).await?;
                writer.flush().await?;
            }

            let Some(line) = lines.next_line().await? else {
                break;
            };

            if mode == Mode::Batch {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                writer
                    .write_all(format!("{}{}\n", PROMPT, trimmed).as_bytes())
                    .await?;
            }

            let (result, exit) = self.execute_line(&line).await?;
            summary.record(&result);

            let rendered = render(&result, self.format);
            if !rendered.is_empty() {
                writer.write_all(rendered.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            writer.flush().await?;

            if exit {
                info!("Exit requested");
                break;
            }
            if mode == Mode::Batch && self.stop_on_error && !result.is_success() {
                info!("Stopping batch at first failure");
                break;
            }
        }

        if mode == Mode::Batch {
            writer
                .write_all(
                    format!(
                        "Ran {} commands: {} succeeded, {} failed\n",
                        summary.succeeded + summary.failed,
                        summary.succeeded,
                        summary.failed
                    )
                    .as_bytes(),
                )
                .await?;
            writer.flush().await?;
        }

        Ok(summary)
    }

    /// Close the page and drop cached element ids
    pub async fn shutdown(&mut self) -> Result<(), ConsoleError> {
        self.dispatcher.shutdown().await
    }
}

/// Text shown for one result; empty for a bare success
pub fn render(result: &DispatchResult, format: OutputFormat) -> String {
    match result {
        DispatchResult::Failure { error } => format!("Error: {}", error),
        DispatchResult::Success { message, data } => {
            let mut parts: Vec<String> = Vec::new();
            if let Some(message) = message {
                parts.push(message.clone());
            }
            if let Some(data) = data {
                parts.push(render_data(data, format));
            }
            parts.join("\n")
        }
    }
}

fn render_data(data: &Value, format: OutputFormat) -> String {
    match (format, data) {
        (OutputFormat::Simple, Value::String(text)) => text.clone(),
        (OutputFormat::Simple, Value::Array(items)) if !items.is_empty() => {
            let lines: Option<Vec<String>> = items.iter().map(render_item).collect();
            lines
                .map(|lines| lines.join("\n"))
                .unwrap_or_else(|| data.to_string())
        }
        (OutputFormat::Simple, _) => data.to_string(),
        (OutputFormat::Json, _) => {
            serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
        }
    }
}

/// `[id] <tag> text -> href` for one listed element
fn render_item(item: &Value) -> Option<String> {
    let id = item.get("id")?.as_u64()?;
    let tag = item.get("tag")?.as_str()?;
    let text = item.get("text")?.as_str()?;

    let mut line = format!("[{}] <{}> {}", id, tag, text);
    let href = item
        .get("resolvedHref")
        .and_then(Value::as_str)
        .or_else(|| item.get("href").and_then(Value::as_str));
    if let Some(href) = href {
        line.push_str(" -> ");
        line.push_str(href);
    }
    Some(line)
}

#[cfg(test)]
#[path = "console_test.rs"]
mod console_test;
