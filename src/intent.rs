//! Typed command intents produced by the parsers and consumed by the executor.

use serde::{Deserialize, Serialize};

/// Default bound for `wait` commands when `--timeout` is not given.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// A fully parsed and validated console command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Load an absolute http(s) URL
    Navigate { url: String },
    /// Load an absolute URL or a path relative to the current page
    Open { target: String },
    /// Dump page markup or the interactive element list
    Show(ShowTarget),
    /// Fill fields, then press the submit control
    Input {
        fields: Vec<FieldEntry>,
        submit_text: String,
    },
    Click { target: ClickTarget },
    /// List interactive elements, optionally filtered
    Links { filter: Option<String> },
    /// Follow the first link matching a pattern
    Follow { pattern: String },
    /// Activate an element by id from the last listing
    Act { id: usize },
    Wait { target: WaitTarget },
    MoveBack,
    MoveForward,
    Reload,
    Print { target: PrintTarget },
    Screenshot { file_name: String },
    Help,
    Exit,
}

impl Intent {
    /// Short verb name used in logs
    pub fn verb(&self) -> &'static str {
        match self {
            Intent::Navigate { .. } => "navigate",
            Intent::Open { .. } => "open",
            Intent::Show(_) => "show",
            Intent::Input { .. } => "input",
            Intent::Click { .. } => "click",
            Intent::Links { .. } => "links",
            Intent::Follow { .. } => "follow",
            Intent::Act { .. } => "act",
            Intent::Wait { .. } => "wait",
            Intent::MoveBack => "move back",
            Intent::MoveForward => "move forward",
            Intent::Reload => "reload",
            Intent::Print { .. } => "print",
            Intent::Screenshot { .. } => "screenshot",
            Intent::Help => "help",
            Intent::Exit => "exit",
        }
    }

    /// Whether executing this intent requires a loaded page
    pub fn requires_page(&self) -> bool {
        !matches!(
            self,
            Intent::Navigate { .. } | Intent::Open { .. } | Intent::Help | Intent::Exit
        )
    }
}

/// What `show` should capture. File names keep the leading `--` as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "lowercase")]
pub enum ShowTarget {
    Code { file_name: String },
    Elements { file_name: Option<String> },
}

/// How a click (or a form field) is addressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum ClickTarget {
    /// Literal CSS selector
    Selector(String),
    /// Case-sensitive substring of a clickable element's text
    Text(String),
    /// Substring of an anchor's href
    Href(String),
    /// Id from the most recent listing
    Index(usize),
}

impl ClickTarget {
    pub fn mode(&self) -> &'static str {
        match self {
            ClickTarget::Selector(_) => "selector",
            ClickTarget::Text(_) => "text",
            ClickTarget::Href(_) => "href",
            ClickTarget::Index(_) => "index",
        }
    }

    /// The addressed value rendered for messages
    pub fn value_string(&self) -> String {
        match self {
            ClickTarget::Selector(v) | ClickTarget::Text(v) | ClickTarget::Href(v) => v.clone(),
            ClickTarget::Index(i) => i.to_string(),
        }
    }
}

/// Addressing for one `input` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum FieldTarget {
    /// Fuzzy match against label/placeholder/name hints
    Text(String),
    Selector(String),
    Index(usize),
}

impl FieldTarget {
    pub fn mode(&self) -> &'static str {
        match self {
            FieldTarget::Text(_) => "text",
            FieldTarget::Selector(_) => "selector",
            FieldTarget::Index(_) => "index",
        }
    }

    /// `"<mode> <value>"`, as used in fill error messages
    pub fn describe(&self) -> String {
        match self {
            FieldTarget::Text(v) | FieldTarget::Selector(v) => format!("{} {}", self.mode(), v),
            FieldTarget::Index(i) => format!("{} {}", self.mode(), i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub target: FieldTarget,
    pub value: String,
}

/// DOM state a selector wait resolves on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    Attached,
    Detached,
    #[default]
    Visible,
    Hidden,
}

impl ElementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementState::Attached => "attached",
            ElementState::Detached => "detached",
            ElementState::Visible => "visible",
            ElementState::Hidden => "hidden",
        }
    }
}

impl std::str::FromStr for ElementState {
    type Err = ();

    /// Exact, lowercase names only
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attached" => Ok(ElementState::Attached),
            "detached" => Ok(ElementState::Detached),
            "visible" => Ok(ElementState::Visible),
            "hidden" => Ok(ElementState::Hidden),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum WaitTarget {
    Url {
        pattern: String,
        timeout_ms: u64,
    },
    Selector {
        selector: String,
        state: ElementState,
        timeout_ms: u64,
    },
}

impl WaitTarget {
    pub fn mode(&self) -> &'static str {
        match self {
            WaitTarget::Url { .. } => "url",
            WaitTarget::Selector { .. } => "selector",
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        match self {
            WaitTarget::Url { timeout_ms, .. } | WaitTarget::Selector { timeout_ms, .. } => {
                *timeout_ms
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintTarget {
    Url,
    Title,
}
