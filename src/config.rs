use std::path::PathBuf;
use std::time::Duration;

use crate::types::{BrowserType, OutputFormat, ViewportSize};

/// Bounded timeouts used by the interaction engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Wait for a resolved element to become visible before acting on it
    pub visible: Duration,
    /// Native click attempt
    pub click: Duration,
    /// Window in which a click may open a new page
    pub popup: Duration,
    /// Best-effort DOM-ready wait after a click
    pub dom_ready: Duration,
    /// Interval between condition checks while waiting
    pub poll: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            visible: Duration::from_millis(7000),
            click: Duration::from_millis(10_000),
            popup: Duration::from_millis(1200),
            dom_ready: Duration::from_millis(5000),
            poll: Duration::from_millis(100),
        }
    }
}

/// Everything the console needs to start, folded from the command line
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub browser: BrowserType,
    pub headless: bool,
    pub viewport: Option<ViewportSize>,
    /// Attach to this WebDriver server instead of managing one
    pub webdriver_url: Option<String>,
    /// Directory receiving `.html`, `.js` and `.png` artifacts
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub stop_on_error: bool,
    pub timeouts: Timeouts,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            browser: BrowserType::Chrome,
            headless: false,
            viewport: None,
            webdriver_url: None,
            output_dir: PathBuf::from("."),
            format: OutputFormat::Simple,
            stop_on_error: false,
            timeouts: Timeouts::default(),
        }
    }
}
