use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Output format for console results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON for data payloads
    Json,
    /// Human-readable simple format
    #[default]
    Simple,
}

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    /// Name of the WebDriver binary serving this browser
    pub fn driver_command(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }

    /// Well-known port the driver listens on when started by hand
    pub fn default_port(&self) -> u16 {
        match self {
            BrowserType::Firefox => 4444,
            BrowserType::Chrome => 9515,
        }
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1920x1080")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1920x1080)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        Ok(ViewportSize { width, height })
    }
}

/// One clickable or fillable element found by a discovery pass.
///
/// `id` is the element's position in the listing that produced it and is only
/// meaningful until the next listing or navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveItem {
    pub id: usize,
    /// Lowercase tag name
    pub tag: String,
    /// Visible text, else aria-label, title or value
    pub text: String,
    /// Raw `href` attribute
    pub href: Option<String>,
    /// `href` resolved against the page URL
    pub resolved_href: Option<String>,
    pub selector: String,
}

impl InteractiveItem {
    /// Case-insensitive match of `query` against text, raw href and resolved href
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.text.to_lowercase().contains(&query)
            || self
                .href
                .as_deref()
                .is_some_and(|href| href.to_lowercase().contains(&query))
            || self
                .resolved_href
                .as_deref()
                .is_some_and(|href| href.to_lowercase().contains(&query))
    }

    /// Resolved href when it is an absolute http(s) URL
    pub fn navigable_href(&self) -> Option<&str> {
        self.resolved_href
            .as_deref()
            .filter(|href| is_absolute_http_url(href))
    }
}

/// A form control that `input` can fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillableField {
    pub selector: String,
    pub tag: String,
    /// `type` attribute for inputs
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Name hints, most reliable first
    pub candidates: Vec<String>,
}

pub fn is_absolute_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
