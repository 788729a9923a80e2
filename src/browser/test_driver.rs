//! In-memory [`PageDriver`] for facade tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::discovery::{fillable_fields_script, interactive_items_script};
use crate::driver::{DriverError, DriverResult, LoadResponse, Locator, OptionChoice, PageDriver};
use crate::intent::ElementState;

/// One selector's worth of elements
#[derive(Debug, Clone)]
pub struct FakeElement {
    pub count: usize,
    pub visible: bool,
    pub tag: String,
    pub native_click_fails: bool,
    pub dispatch_click_fails: bool,
    /// URL the page moves to when clicked
    pub navigates_to: Option<String>,
    /// URL of a new page opened when clicked
    pub opens_popup: Option<String>,
    /// `(label, value)` pairs for selects
    pub options: Vec<(String, String)>,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            count: 1,
            visible: true,
            tag: tag.to_string(),
            native_click_fails: false,
            dispatch_click_fails: false,
            navigates_to: None,
            opens_popup: None,
            options: Vec::new(),
        }
    }
}

pub struct FakePage {
    pub url: String,
    pub title: String,
    pub content: String,
    pub back: Vec<String>,
    pub forward: Vec<String>,
    /// Answer to `goto`/`reload`; `None` simulates a missing response
    pub load: Option<LoadResponse>,
    pub goto_fails: bool,
    pub screenshot_fails: bool,
    /// Raw result of the interactive-items discovery script
    pub items: Value,
    /// Raw result of the fillable-fields discovery script
    pub fields: Value,
    pub elements: HashMap<String, FakeElement>,
    pub handles: Vec<String>,
    pub popups: HashMap<String, String>,
    pub calls: Vec<String>,
    pub filled: Vec<(String, String)>,
    pub closed: bool,
}

pub struct FakeDriver {
    page: Mutex<FakePage>,
}

fn key(locator: &Locator) -> String {
    match &locator.has_text {
        Some(text) => format!("{}|{}", locator.selector, text),
        None => locator.selector.clone(),
    }
}

impl FakeDriver {
    /// A fresh tab showing `about:blank`
    pub fn new() -> Self {
        Self {
            page: Mutex::new(FakePage {
                url: "about:blank".to_string(),
                title: String::new(),
                content: "<html></html>".to_string(),
                back: Vec::new(),
                forward: Vec::new(),
                load: Some(LoadResponse {
                    status: Some(200),
                    finished_error: None,
                }),
                goto_fails: false,
                screenshot_fails: false,
                items: json!([]),
                fields: json!([]),
                elements: HashMap::new(),
                handles: vec!["main".to_string()],
                popups: HashMap::new(),
                calls: Vec::new(),
                filled: Vec::new(),
                closed: false,
            }),
        }
    }

    /// A tab already showing `url`
    pub fn on(url: &str) -> Self {
        let driver = Self::new();
        driver.page().url = url.to_string();
        driver
    }

    pub fn page(&self) -> MutexGuard<'_, FakePage> {
        self.page.lock().unwrap()
    }

    pub fn element(&self, selector: &str, element: FakeElement) {
        self.page().elements.insert(selector.to_string(), element);
    }

    pub fn calls(&self) -> Vec<String> {
        self.page().calls.clone()
    }

    fn record(&self, call: String) {
        self.page().calls.push(call);
    }

    fn find(&self, locator: &Locator) -> DriverResult<FakeElement> {
        self.page()
            .elements
            .get(&key(locator))
            .filter(|e| e.count > 0)
            .cloned()
            .ok_or_else(|| DriverError::NoSuchElement(locator.selector.clone()))
    }

    fn apply_click(&self, element: &FakeElement) {
        let mut page = self.page();
        if let Some(url) = &element.navigates_to {
            let previous = std::mem::replace(&mut page.url, url.clone());
            page.back.push(previous);
            page.forward.clear();
        }
        if let Some(url) = &element.opens_popup {
            let handle = format!("popup-{}", page.handles.len());
            page.handles.push(handle.clone());
            page.popups.insert(handle, url.clone());
        }
    }

    fn load(&self, url: Option<&str>) -> DriverResult<Option<LoadResponse>> {
        let mut page = self.page();
        if page.goto_fails {
            return Err(DriverError::Transport("net::ERR_NAME_NOT_RESOLVED".to_string()));
        }
        let response = page.load.clone();
        if let (Some(url), Some(_)) = (url, &response) {
            let previous = std::mem::replace(&mut page.url, url.to_string());
            if previous != "about:blank" {
                page.back.push(previous);
            }
            page.forward.clear();
        }
        Ok(response)
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn goto(&self, url: &str) -> DriverResult<Option<LoadResponse>> {
        self.record(format!("goto {}", url));
        self.load(Some(url))
    }

    async fn reload(&self) -> DriverResult<Option<LoadResponse>> {
        self.record("reload".to_string());
        self.load(None)
    }

    async fn go_back(&self) -> DriverResult<bool> {
        let mut page = self.page();
        let Some(url) = page.back.pop() else {
            return Ok(false);
        };
        let current = std::mem::replace(&mut page.url, url);
        page.forward.push(current);
        Ok(true)
    }

    async fn go_forward(&self) -> DriverResult<bool> {
        let mut page = self.page();
        let Some(url) = page.forward.pop() else {
            return Ok(false);
        };
        let current = std::mem::replace(&mut page.url, url);
        page.back.push(current);
        Ok(true)
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.page().url.clone())
    }

    async fn title(&self) -> DriverResult<String> {
        Ok(self.page().title.clone())
    }

    async fn content(&self) -> DriverResult<String> {
        Ok(self.page().content.clone())
    }

    async fn screenshot(&self, path: &Path) -> DriverResult<()> {
        if self.page().screenshot_fails {
            return Err(DriverError::Transport("screenshot unavailable".to_string()));
        }
        tokio::fs::write(path, b"\x89PNG").await?;
        Ok(())
    }

    async fn evaluate(&self, script: &str, _args: Vec<Value>) -> DriverResult<Value> {
        let page = self.page();
        if script == interactive_items_script() {
            Ok(page.items.clone())
        } else if script == fillable_fields_script() {
            Ok(page.fields.clone())
        } else {
            Ok(Value::Null)
        }
    }

    async fn wait_for_condition(
        &self,
        _script: &str,
        args: Vec<Value>,
        timeout: Duration,
    ) -> DriverResult<()> {
        let needle = args.first().and_then(Value::as_str).unwrap_or_default();
        let satisfied = self.page().url.to_lowercase().contains(needle);
        if satisfied {
            return Ok(());
        }
        tokio::time::sleep(timeout).await;
        Err(DriverError::Timeout(timeout))
    }

    async fn wait_for_dom_ready(&self, _timeout: Duration) -> DriverResult<()> {
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> DriverResult<usize> {
        Ok(self
            .page()
            .elements
            .get(&key(locator))
            .map_or(0, |e| e.count))
    }

    async fn scroll_into_view(&self, locator: &Locator) -> DriverResult<()> {
        self.find(locator).map(|_| ())
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> DriverResult<()> {
        let element = self.find(locator).ok();
        let reached = match state {
            ElementState::Attached => element.is_some(),
            ElementState::Detached => element.is_none(),
            ElementState::Visible => element.is_some_and(|e| e.visible),
            ElementState::Hidden => !element.is_some_and(|e| e.visible),
        };
        if reached {
            return Ok(());
        }
        tokio::time::sleep(timeout).await;
        Err(DriverError::Timeout(timeout))
    }

    async fn click(&self, locator: &Locator, timeout: Duration) -> DriverResult<()> {
        self.record(format!("click {}", key(locator)));
        let element = self.find(locator)?;
        if element.native_click_fails {
            return Err(DriverError::Timeout(timeout));
        }
        self.apply_click(&element);
        Ok(())
    }

    async fn dispatch_click(&self, locator: &Locator) -> DriverResult<()> {
        self.record(format!("dispatch_click {}", key(locator)));
        let element = self.find(locator)?;
        if element.dispatch_click_fails {
            return Err(DriverError::Script("element detached".to_string()));
        }
        self.apply_click(&element);
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> DriverResult<()> {
        self.find(locator)?;
        self.page()
            .filled
            .push((key(locator), value.to_string()));
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, choice: OptionChoice<'_>) -> DriverResult<()> {
        let element = self.find(locator)?;
        let selected = element.options.iter().find(|(label, value)| match choice {
            OptionChoice::Label(wanted) => label == wanted,
            OptionChoice::Value(wanted) => value == wanted,
        });
        match selected {
            Some((_, value)) => {
                self.page().filled.push((key(locator), value.clone()));
                Ok(())
            }
            None => Err(DriverError::Script("no such option".to_string())),
        }
    }

    async fn tag_name(&self, locator: &Locator) -> DriverResult<String> {
        Ok(self.find(locator)?.tag)
    }

    async fn page_handles(&self) -> DriverResult<Vec<String>> {
        Ok(self.page().handles.clone())
    }

    async fn wait_for_new_page(&self, known: &[String], timeout: Duration) -> Option<String> {
        let poll = async {
            loop {
                let fresh = self
                    .page()
                    .handles
                    .iter()
                    .find(|h| !known.contains(h))
                    .cloned();
                if let Some(handle) = fresh {
                    return handle;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.ok()
    }

    async fn page_url(&self, handle: &str, _timeout: Duration) -> DriverResult<String> {
        self.page()
            .popups
            .get(handle)
            .cloned()
            .ok_or_else(|| DriverError::NoSuchElement(handle.to_string()))
    }

    async fn close(&self) -> DriverResult<()> {
        self.page().closed = true;
        Ok(())
    }
}
