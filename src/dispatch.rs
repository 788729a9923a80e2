//! Readiness gate and intent execution.

use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::errors::ConsoleError;
use crate::intent::{ClickTarget, FieldEntry, Intent, PrintTarget, ShowTarget, WaitTarget};
use crate::session::{Readiness, SessionState};

pub const NO_PAGE_ERROR: &str = "No page loaded. Use 'navigate <url>' first.";

pub const HELP_MESSAGE: &str = "Available commands: navigate, open, show, input, links, follow, act, wait, click, move back, move forward, reload, print url, print title, screenshot, help, exit";

/// Outcome of one command, rendered back to the console
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    Success {
        message: Option<String>,
        data: Option<Value>,
    },
    Failure {
        error: String,
    },
}

impl DispatchResult {
    pub fn ok(message: impl Into<String>) -> Self {
        DispatchResult::Success {
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn ok_with_data(message: impl Into<String>, data: Value) -> Self {
        DispatchResult::Success {
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn bare() -> Self {
        DispatchResult::Success {
            message: None,
            data: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        DispatchResult::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchResult::Success { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            DispatchResult::Success { message, .. } => message.as_deref(),
            DispatchResult::Failure { .. } => None,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            DispatchResult::Success { data, .. } => data.as_ref(),
            DispatchResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DispatchResult::Failure { error } => Some(error),
            DispatchResult::Success { .. } => None,
        }
    }
}

impl Serialize for DispatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            DispatchResult::Success { message, data } => {
                map.serialize_entry("success", &true)?;
                if let Some(message) = message {
                    map.serialize_entry("message", message)?;
                }
                if let Some(data) = data {
                    map.serialize_entry("data", data)?;
                }
            }
            DispatchResult::Failure { error } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

/// Only failure to bring up the page escapes as `Err`; every other problem is a
/// [`DispatchResult::Failure`].
pub type ControllerResult = Result<DispatchResult, ConsoleError>;

/// Browser-facing operations the executor maps intents onto
#[async_trait]
pub trait BrowserController: Send + Sync {
    /// Successful loads carry `{"url": <final url>}` as data
    async fn navigate(&self, url: &str) -> ControllerResult;
    async fn open(&self, target: &str) -> ControllerResult;
    async fn show_code(&self, file_name: &str) -> ControllerResult;
    async fn show_elements(&self, file_name: Option<&str>) -> ControllerResult;
    async fn input(&self, fields: &[FieldEntry], submit_text: &str) -> ControllerResult;
    async fn click(&self, target: &ClickTarget) -> ControllerResult;
    async fn links(&self, filter: Option<&str>) -> ControllerResult;
    async fn follow(&self, pattern: &str) -> ControllerResult;
    async fn act(&self, id: usize) -> ControllerResult;
    async fn wait(&self, target: &WaitTarget) -> ControllerResult;
    async fn move_back(&self) -> ControllerResult;
    async fn move_forward(&self) -> ControllerResult;
    async fn reload(&self) -> ControllerResult;
    async fn current_url(&self) -> ControllerResult;
    async fn current_title(&self) -> ControllerResult;
    async fn screenshot(&self, file_name: &str) -> ControllerResult;
    /// Close the page and drop cached element ids
    async fn close(&mut self) -> Result<(), ConsoleError>;
}

/// Run one intent against the controller, recording successful page loads in `state`
pub async fn execute_intent<C: BrowserController + ?Sized>(
    intent: &Intent,
    state: &mut SessionState,
    controller: &C,
) -> ControllerResult {
    let result = match intent {
        Intent::Navigate { url } => {
            let result = controller.navigate(url).await?;
            if result.is_success() {
                state.mark_loaded(url.as_str());
            }
            result
        }
        Intent::Open { target } => {
            let result = controller.open(target).await?;
            record_open(state, &result, target);
            result
        }
        Intent::Show(ShowTarget::Code { file_name }) => controller.show_code(file_name).await?,
        Intent::Show(ShowTarget::Elements { file_name }) => {
            controller.show_elements(file_name.as_deref()).await?
        }
        Intent::Input {
            fields,
            submit_text,
        } => controller.input(fields, submit_text).await?,
        Intent::Click { target } => controller.click(target).await?,
        Intent::Links { filter } => controller.links(filter.as_deref()).await?,
        Intent::Follow { pattern } => controller.follow(pattern).await?,
        Intent::Act { id } => controller.act(*id).await?,
        Intent::Wait { target } => controller.wait(target).await?,
        Intent::MoveBack => controller.move_back().await?,
        Intent::MoveForward => controller.move_forward().await?,
        Intent::Reload => controller.reload().await?,
        Intent::Print {
            target: PrintTarget::Url,
        } => controller.current_url().await?,
        Intent::Print {
            target: PrintTarget::Title,
        } => controller.current_title().await?,
        Intent::Screenshot { file_name } => controller.screenshot(file_name).await?,
        Intent::Help => DispatchResult::ok(HELP_MESSAGE),
        Intent::Exit => DispatchResult::bare(),
    };
    Ok(result)
}

/// Relative targets are recorded as the URL they resolved to
fn record_open(state: &mut SessionState, result: &DispatchResult, requested: &str) {
    if !result.is_success() {
        return;
    }
    let url = result
        .data()
        .and_then(|data| data.get("url"))
        .and_then(Value::as_str)
        .unwrap_or(requested);
    state.mark_loaded(url);
}

/// Owns the session state and gates page-dependent intents on it
pub struct Dispatcher<C> {
    state: SessionState,
    controller: C,
}

impl<C: BrowserController> Dispatcher<C> {
    pub fn new(controller: C) -> Self {
        Self {
            state: SessionState::new(),
            controller,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub async fn dispatch(&mut self, intent: &Intent) -> ControllerResult {
        if intent.requires_page() && self.state.readiness() == Readiness::NoPage {
            debug!("Rejected {} with no page loaded", intent.verb());
            return Ok(DispatchResult::fail(NO_PAGE_ERROR));
        }
        execute_intent(intent, &mut self.state, &self.controller).await
    }

    pub async fn shutdown(&mut self) -> Result<(), ConsoleError> {
        self.controller.close().await
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;
