use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{
    DriverError, DriverResult, GLOBAL_DRIVER_MANAGER, LoadResponse, Locator, OptionChoice,
    PageDriver, PageLauncher,
};
use crate::config::ConsoleConfig;
use crate::intent::ElementState;
use crate::types::{BrowserType, ViewportSize};

impl From<CmdError> for DriverError {
    fn from(err: CmdError) -> Self {
        DriverError::Transport(err.to_string())
    }
}

/// Submit and button inputs show their `value`, not their text content
fn labelled_by_value(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("input")
}

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared prelude for locator scripts: `arguments[0]` is the selector,
/// `arguments[1]` the optional text filter.
const MATCHES_JS: &str = r#"
const matches = Array.from(document.querySelectorAll(arguments[0])).filter((el) => {
  const needle = arguments[1];
  if (needle == null) return true;
  const label = el.tagName === "INPUT" ? el.value || "" : el.innerText || el.textContent || "";
  return label.includes(needle);
});
"#;

const ELEMENT_STATE_JS: &str = r#"
const el = matches[0];
if (!el) return "detached";
const style = window.getComputedStyle(el);
const shown = el.getClientRects().length > 0 && style.visibility !== "hidden" && style.display !== "none";
return shown ? "visible" : "hidden";
"#;

const SCROLL_JS: &str = r#"
const el = matches[0];
if (!el) return false;
el.scrollIntoView({ block: "center", inline: "nearest" });
return true;
"#;

const DISPATCH_CLICK_JS: &str = r#"
const el = matches[0];
if (!el) return false;
el.click();
return true;
"#;

const TAG_NAME_JS: &str = r#"
const el = matches[0];
return el ? el.tagName.toLowerCase() : null;
"#;

/// `arguments[2]` is "label" or "value", `arguments[3]` the wanted option
const SELECT_OPTION_JS: &str = r#"
const el = matches[0];
if (!el || el.tagName.toLowerCase() !== "select") return false;
const wanted = arguments[3];
const option = Array.from(el.options).find((o) =>
  arguments[2] === "label" ? o.label === wanted || o.text.trim() === wanted : o.value === wanted
);
if (!option) return false;
el.value = option.value;
el.dispatchEvent(new Event("input", { bubbles: true }));
el.dispatchEvent(new Event("change", { bubbles: true }));
return true;
"#;

const LOAD_STATUS_JS: &str = r#"
const nav = performance.getEntriesByType("navigation")[0];
return nav && nav.responseStatus ? nav.responseStatus : null;
"#;

const DOM_READY_JS: &str = "return document.readyState !== 'loading';";

/// URLs browsers show when a load fails below HTTP
const ERROR_PAGE_PREFIXES: [&str; 3] = ["chrome-error://", "about:neterror", "about:certerror"];

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// A single browser page driven over the WebDriver protocol
pub struct WebDriverPage {
    client: Client,
    poll_interval: Duration,
}

impl WebDriverPage {
    pub fn new(client: Client, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    async fn run_locator_script(
        &self,
        body: &str,
        locator: &Locator,
        extra: Vec<Value>,
    ) -> DriverResult<Value> {
        let script = format!("{}{}", MATCHES_JS, body);
        let mut args = vec![json!(locator.selector), json!(locator.has_text)];
        args.extend(extra);
        self.evaluate(&script, args).await
    }

    async fn element_state(&self, locator: &Locator) -> DriverResult<String> {
        let state = self
            .run_locator_script(ELEMENT_STATE_JS, locator, vec![])
            .await?;
        Ok(state.as_str().unwrap_or("detached").to_string())
    }

    /// Status of the document that just loaded
    async fn load_response(&self) -> DriverResult<Option<LoadResponse>> {
        let url = self.current_url().await?;
        if let Some(prefix) = ERROR_PAGE_PREFIXES.iter().find(|p| url.starts_with(**p)) {
            return Ok(Some(LoadResponse {
                status: None,
                finished_error: Some(format!("browser showed an error page ({})", prefix)),
            }));
        }

        let status = self
            .evaluate(LOAD_STATUS_JS, vec![])
            .await?
            .as_u64()
            .and_then(|s| u16::try_from(s).ok());
        Ok(Some(LoadResponse {
            status,
            finished_error: None,
        }))
    }

    async fn history_step(&self, back: bool) -> DriverResult<bool> {
        let before = self.current_url().await?;
        if back {
            self.client.back().await?;
        } else {
            self.client.forward().await?;
        }
        self.settle(SETTLE_TIMEOUT, "history step").await;
        Ok(self.current_url().await? != before)
    }

    /// Best-effort DOM-ready wait; a page still loading is reported as it stands
    async fn settle(&self, timeout: Duration, after: &str) {
        if let Err(e) = self.wait_for_dom_ready(timeout).await {
            debug!("DOM not ready after {}: {}", after, e);
        }
    }

    async fn first_element(&self, locator: &Locator) -> DriverResult<fantoccini::elements::Element> {
        let elements = self
            .client
            .find_all(fantoccini::Locator::Css(&locator.selector))
            .await?;
        for element in elements {
            match &locator.has_text {
                None => return Ok(element),
                Some(text) => {
                    let label = if labelled_by_value(&element.tag_name().await?) {
                        element.attr("value").await?.unwrap_or_default()
                    } else {
                        element.text().await?
                    };
                    if label.contains(text.as_str()) {
                        return Ok(element);
                    }
                }
            }
        }
        Err(DriverError::NoSuchElement(locator.selector.clone()))
    }
}

#[async_trait]
impl PageDriver for WebDriverPage {
    async fn goto(&self, url: &str) -> DriverResult<Option<LoadResponse>> {
        info!("Navigating to {}", url);
        self.client.goto(url).await?;
        self.settle(SETTLE_TIMEOUT, "navigation").await;
        self.load_response().await
    }

    async fn reload(&self) -> DriverResult<Option<LoadResponse>> {
        self.client.refresh().await?;
        self.settle(SETTLE_TIMEOUT, "reload").await;
        self.load_response().await
    }

    async fn go_back(&self) -> DriverResult<bool> {
        self.history_step(true).await
    }

    async fn go_forward(&self) -> DriverResult<bool> {
        self.history_step(false).await
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn title(&self) -> DriverResult<String> {
        Ok(self.client.title().await?)
    }

    async fn content(&self) -> DriverResult<String> {
        Ok(self.client.source().await?)
    }

    async fn screenshot(&self, path: &Path) -> DriverResult<()> {
        let png = self.client.screenshot().await?;
        tokio::fs::write(path, png).await?;
        Ok(())
    }

    async fn evaluate(&self, script: &str, args: Vec<Value>) -> DriverResult<Value> {
        self.client
            .execute(script, args)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn wait_for_condition(
        &self,
        script: &str,
        args: Vec<Value>,
        timeout: Duration,
    ) -> DriverResult<()> {
        let poll = async {
            loop {
                match self.evaluate(script, args.clone()).await {
                    Ok(value) if is_truthy(&value) => return,
                    Ok(_) => {}
                    // Navigation in flight detaches the script context
                    Err(e) => debug!("Condition check failed: {}", e),
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| DriverError::Timeout(timeout))
    }

    async fn wait_for_dom_ready(&self, timeout: Duration) -> DriverResult<()> {
        self.wait_for_condition(DOM_READY_JS, vec![], timeout).await
    }

    async fn count(&self, locator: &Locator) -> DriverResult<usize> {
        let count = self
            .run_locator_script("return matches.length;", locator, vec![])
            .await?;
        Ok(count.as_u64().unwrap_or(0) as usize)
    }

    async fn scroll_into_view(&self, locator: &Locator) -> DriverResult<()> {
        let found = self.run_locator_script(SCROLL_JS, locator, vec![]).await?;
        if is_truthy(&found) {
            Ok(())
        } else {
            Err(DriverError::NoSuchElement(locator.selector.clone()))
        }
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> DriverResult<()> {
        let poll = async {
            loop {
                if let Ok(current) = self.element_state(locator).await {
                    let reached = match state {
                        ElementState::Attached => current != "detached",
                        ElementState::Detached => current == "detached",
                        ElementState::Visible => current == "visible",
                        ElementState::Hidden => current != "visible",
                    };
                    if reached {
                        return;
                    }
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| DriverError::Timeout(timeout))
    }

    async fn click(&self, locator: &Locator, timeout: Duration) -> DriverResult<()> {
        let attempt = async {
            let element = self.first_element(locator).await?;
            element.click().await?;
            Ok::<(), DriverError>(())
        };
        tokio::time::timeout(timeout, attempt)
            .await
            .map_err(|_| DriverError::Timeout(timeout))?
    }

    async fn dispatch_click(&self, locator: &Locator) -> DriverResult<()> {
        let clicked = self
            .run_locator_script(DISPATCH_CLICK_JS, locator, vec![])
            .await?;
        if is_truthy(&clicked) {
            Ok(())
        } else {
            Err(DriverError::NoSuchElement(locator.selector.clone()))
        }
    }

    async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()> {
        let element = self.first_element(locator).await?;
        element.clear().await?;
        element.send_keys(value).await?;
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, choice: OptionChoice<'_>) -> DriverResult<()> {
        let (by, wanted) = match choice {
            OptionChoice::Label(label) => ("label", label),
            OptionChoice::Value(value) => ("value", value),
        };
        let selected = self
            .run_locator_script(SELECT_OPTION_JS, locator, vec![json!(by), json!(wanted)])
            .await?;
        if is_truthy(&selected) {
            Ok(())
        } else {
            Err(DriverError::Script(format!("no option with {} {}", by, wanted)))
        }
    }

    async fn tag_name(&self, locator: &Locator) -> DriverResult<String> {
        match self.run_locator_script(TAG_NAME_JS, locator, vec![]).await? {
            Value::String(tag) => Ok(tag),
            _ => Err(DriverError::NoSuchElement(locator.selector.clone())),
        }
    }

    async fn page_handles(&self) -> DriverResult<Vec<String>> {
        let handles = self.client.windows().await?;
        Ok(handles.into_iter().map(String::from).collect())
    }

    async fn wait_for_new_page(&self, known: &[String], timeout: Duration) -> Option<String> {
        let poll = async {
            loop {
                if let Ok(handles) = self.page_handles().await
                    && let Some(handle) = handles.into_iter().find(|h| !known.contains(h))
                {
                    return handle;
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.ok()
    }

    async fn page_url(&self, handle: &str, timeout: Duration) -> DriverResult<String> {
        let original = self.client.window().await?;
        let target = WindowHandle::try_from(handle.to_string())
            .map_err(|e| DriverError::Transport(e.to_string()))?;

        self.client.switch_to_window(target).await?;
        self.settle(timeout, "switching to popup").await;
        let url = self.current_url().await;
        self.client.switch_to_window(original).await?;
        url
    }

    async fn close(&self) -> DriverResult<()> {
        self.client.clone().close().await?;
        Ok(())
    }
}

/// Opens a browser session through a WebDriver server
pub struct WebDriverLauncher {
    browser: BrowserType,
    headless: bool,
    viewport: Option<ViewportSize>,
    webdriver_url: Option<String>,
    poll_interval: Duration,
}

impl WebDriverLauncher {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            browser: config.browser,
            headless: config.headless,
            viewport: config.viewport.clone(),
            webdriver_url: config.webdriver_url.clone(),
            poll_interval: config.timeouts.poll,
        }
    }

    /// Session capabilities for the configured browser
    pub fn capabilities(&self) -> serde_json::Map<String, Value> {
        let mut caps = serde_json::Map::new();

        match self.browser {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if self.headless {
                    args.push("--headless".to_string());
                }
                if let Some(vp) = &self.viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if self.headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                if let Some(vp) = &self.viewport {
                    args.push(format!("--window-size={},{}", vp.width, vp.height));
                }
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        caps
    }
}

#[async_trait]
impl PageLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn PageDriver>> {
        info!("Connecting to {:?} WebDriver", self.browser);

        let webdriver_url = match &self.webdriver_url {
            Some(url) => url.clone(),
            None => GLOBAL_DRIVER_MANAGER.ensure_driver(self.browser).await?,
        };

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::rustls()
            .capabilities(self.capabilities())
            .connect(&webdriver_url)
            .await
            .context("Failed to connect to WebDriver")?;

        if let Some(vp) = &self.viewport
            && let Err(e) = client.set_window_size(vp.width, vp.height).await
        {
            debug!("Could not set window size: {}", e);
        }

        Ok(Box::new(WebDriverPage::new(client, self.poll_interval)))
    }
}

#[cfg(test)]
#[path = "webdriver_test.rs"]
mod webdriver_test;
