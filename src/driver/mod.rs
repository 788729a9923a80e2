//! Narrow capability interface over the page automation engine.
//!
//! Everything above this module talks to a [`PageDriver`]; the only production
//! implementation is [`webdriver::WebDriverPage`], tests use in-memory doubles.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::intent::ElementState;

pub mod manager;
pub mod webdriver;

pub use manager::{DriverManager, GLOBAL_DRIVER_MANAGER};
pub use webdriver::{WebDriverLauncher, WebDriverPage};

/// Failure reported by the page driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("no element matches {0}")]
    NoSuchElement(String),
    #[error("script failed: {0}")]
    Script(String),
    #[error("webdriver command failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Zero or more elements matching `selector`, optionally narrowed to those whose
/// text contains `has_text`. Re-evaluated on every use; actions target the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub selector: String,
    pub has_text: Option<String>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            has_text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }
}

/// Outcome of a page load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadResponse {
    /// HTTP status of the main document, when the engine exposes it
    pub status: Option<u16>,
    /// Set when the load ended in a network-level failure
    pub finished_error: Option<String>,
}

impl LoadResponse {
    /// Unknown status counts as success
    pub fn ok(&self) -> bool {
        self.status.is_none_or(|status| (200..300).contains(&status))
    }
}

/// How `select_option` picks an `<option>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionChoice<'a> {
    Label(&'a str),
    Value(&'a str),
}

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load `url`; `None` when the engine produced no response at all
    async fn goto(&self, url: &str) -> DriverResult<Option<LoadResponse>>;
    async fn reload(&self) -> DriverResult<Option<LoadResponse>>;
    /// `false` when there is no history entry to move to
    async fn go_back(&self) -> DriverResult<bool>;
    async fn go_forward(&self) -> DriverResult<bool>;

    async fn current_url(&self) -> DriverResult<String>;
    async fn title(&self) -> DriverResult<String>;
    /// Full serialized markup of the page
    async fn content(&self) -> DriverResult<String>;
    /// Write a PNG capture of the viewport to `path`
    async fn screenshot(&self, path: &Path) -> DriverResult<()>;

    /// Run `script` as a function body with `arguments` bound to `args`
    async fn evaluate(&self, script: &str, args: Vec<Value>) -> DriverResult<Value>;
    /// Poll `script` until it returns a truthy value or `timeout` elapses
    async fn wait_for_condition(
        &self,
        script: &str,
        args: Vec<Value>,
        timeout: Duration,
    ) -> DriverResult<()>;
    async fn wait_for_dom_ready(&self, timeout: Duration) -> DriverResult<()>;

    async fn count(&self, locator: &Locator) -> DriverResult<usize>;
    async fn scroll_into_view(&self, locator: &Locator) -> DriverResult<()>;
    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> DriverResult<()>;
    /// Native click through the automation engine
    async fn click(&self, locator: &Locator, timeout: Duration) -> DriverResult<()>;
    /// Programmatic `element.click()` inside the page
    async fn dispatch_click(&self, locator: &Locator) -> DriverResult<()>;
    async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()>;
    async fn select_option(&self, locator: &Locator, choice: OptionChoice<'_>) -> DriverResult<()>;
    /// Lowercase tag name of the first match
    async fn tag_name(&self, locator: &Locator) -> DriverResult<String>;

    /// Handles of every open page in the session
    async fn page_handles(&self) -> DriverResult<Vec<String>>;
    /// Handle of a page not in `known`, if one appears within `timeout`
    async fn wait_for_new_page(&self, known: &[String], timeout: Duration) -> Option<String>;
    /// URL of another page once it is DOM-ready, leaving focus on the current page
    async fn page_url(&self, handle: &str, timeout: Duration) -> DriverResult<String>;

    async fn close(&self) -> DriverResult<()>;
}

/// Builds the page the console drives
#[async_trait]
pub trait PageLauncher: Send + Sync {
    async fn launch(&self) -> anyhow::Result<Box<dyn PageDriver>>;
}
