use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Map, Value, json};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::artifact_stem;
use super::cache::InteractionCache;
use super::discovery::{
    collect_fillable_fields, collect_interactive_items, escape_for_css, fill_by_locator,
    find_field_by_name, normalize_text,
};
use super::navigation::NavigationService;
use crate::config::Timeouts;
use crate::dispatch::DispatchResult;
use crate::driver::{DriverError, Locator, PageDriver};
use crate::intent::{ClickTarget, ElementState, FieldEntry, FieldTarget, WaitTarget};
use crate::types::{FillableField, InteractiveItem};

/// Elements a `click --text` may land on
const CLICKABLE_SELECTOR: &str =
    "a, button, [role='button'], input[type='button'], input[type='submit']";

/// Tags considered when looking for an `input` submit control
const SUBMIT_TAGS: [&str; 4] = ["button", "input", "a", "div"];

pub const NO_CACHE_ERROR: &str = "No cached element list found. Run `links` first.";

const URL_CONTAINS_JS: &str = "return window.location.href.toLowerCase().includes(arguments[0]);";

fn discovery_failure(e: DriverError) -> DispatchResult {
    warn!("Element discovery failed: {}", e);
    DispatchResult::fail(format!("Failed to collect page elements: {}", e))
}

/// Clicking, filling, listing and waiting. Owns the element-id cache.
pub struct InteractionService {
    cache: InteractionCache,
    timeouts: Timeouts,
    output_dir: PathBuf,
}

impl InteractionService {
    pub fn new(timeouts: Timeouts, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache: InteractionCache::default(),
            timeouts,
            output_dir: output_dir.into(),
        }
    }

    pub fn cache(&self) -> &InteractionCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.invalidate();
    }

    /// Refill an empty cache from a fresh discovery
    async fn ensure_cache(&mut self, page: &dyn PageDriver) -> Result<(), DispatchResult> {
        if self.cache.is_empty() {
            let items = collect_interactive_items(page)
                .await
                .map_err(discovery_failure)?;
            self.cache.replace(items);
        }
        Ok(())
    }

    pub async fn show_elements(
        &mut self,
        page: &dyn PageDriver,
        file_name: Option<&str>,
    ) -> DispatchResult {
        let items = match collect_interactive_items(page).await {
            Ok(items) => items,
            Err(e) => return discovery_failure(e),
        };

        if let Some(file_name) = file_name {
            let path = self
                .output_dir
                .join(format!("{}.js", artifact_stem(file_name)));
            let written = match serde_json::to_string_pretty(&items) {
                Ok(body) => tokio::fs::write(&path, body).await.is_ok(),
                Err(_) => false,
            };
            if !written {
                warn!("Could not write {}", path.display());
                return DispatchResult::fail("Failed to save elements to file");
            }
        }

        let message = format!("Extracted {} elements", items.len());
        self.cache.replace(items);
        DispatchResult::ok_with_data(message, json!(self.cache.items()))
    }

    pub async fn links(&mut self, page: &dyn PageDriver, filter: Option<&str>) -> DispatchResult {
        let items = match collect_interactive_items(page).await {
            Ok(items) => items,
            Err(e) => return discovery_failure(e),
        };

        let items: Vec<InteractiveItem> = match filter {
            Some(query) => items.into_iter().filter(|item| item.matches(query)).collect(),
            None => items,
        };
        self.cache.replace(items);

        DispatchResult::ok_with_data(
            format!("Found {} interactive elements", self.cache.items().len()),
            json!(self.cache.items()),
        )
    }

    pub async fn follow(
        &mut self,
        page: &dyn PageDriver,
        navigation: &NavigationService,
        pattern: &str,
    ) -> DispatchResult {
        let items = match collect_interactive_items(page).await {
            Ok(items) => items,
            Err(e) => return discovery_failure(e),
        };

        let Some(matched) = items
            .into_iter()
            .find(|item| item.tag == "a" && item.matches(pattern))
        else {
            return DispatchResult::fail(format!("No link matched pattern: {}", pattern));
        };

        if let Some(href) = matched.navigable_href() {
            let result = navigation.open(page, href).await;
            if !result.is_success() {
                return result;
            }
            self.cache.invalidate();
            return DispatchResult::ok_with_data(
                format!("Followed link using pattern: {}", pattern),
                json!({ "matched": matched }),
            );
        }

        let locator = Locator::css(&matched.selector);
        self.click_locator(
            page,
            &locator,
            metadata(json!({ "mode": "follow", "pattern": pattern, "matched": matched })),
        )
        .await
    }

    pub async fn act(
        &mut self,
        page: &dyn PageDriver,
        navigation: &NavigationService,
        id: usize,
    ) -> DispatchResult {
        if self.cache.is_empty() {
            return DispatchResult::fail(NO_CACHE_ERROR);
        }
        let Some(matched) = self.cache.get(id).cloned() else {
            return DispatchResult::fail(format!(
                "Element id {} not found. Run links again to refresh IDs.",
                id
            ));
        };

        if let Some(href) = matched.navigable_href() {
            let result = navigation.open(page, href).await;
            if result.is_success() {
                self.cache.invalidate();
            }
            return result;
        }

        let locator = Locator::css(&matched.selector);
        self.click_locator(
            page,
            &locator,
            metadata(json!({ "mode": "act", "id": id, "matched": matched })),
        )
        .await
    }

    pub async fn click(&mut self, page: &dyn PageDriver, target: &ClickTarget) -> DispatchResult {
        let (locator, details) = match target {
            ClickTarget::Selector(selector) => (
                Locator::css(selector),
                json!({ "mode": "selector", "value": selector }),
            ),
            ClickTarget::Text(text) => (
                Locator::css(CLICKABLE_SELECTOR).with_text(text),
                json!({ "mode": "text", "value": text }),
            ),
            ClickTarget::Href(href) => (
                Locator::css(format!("a[href*=\"{}\"]", escape_for_css(href))),
                json!({ "mode": "href", "value": href }),
            ),
            ClickTarget::Index(index) => {
                if let Err(failure) = self.ensure_cache(page).await {
                    return failure;
                }
                let Some(matched) = self.cache.get(*index).cloned() else {
                    return DispatchResult::fail(format!(
                        "No element found for index {}. Run links to inspect valid IDs.",
                        index
                    ));
                };
                (
                    Locator::css(&matched.selector),
                    json!({ "mode": "index", "value": index, "matched": matched }),
                )
            }
        };

        self.click_locator(page, &locator, metadata(details)).await
    }

    pub async fn input(
        &mut self,
        page: &dyn PageDriver,
        fields: &[FieldEntry],
        submit_text: &str,
    ) -> DispatchResult {
        let mut fillable: Option<Vec<FillableField>> = None;

        for entry in fields {
            let missing = || {
                DispatchResult::fail(format!(
                    "No input field found for target: {}",
                    entry.target.describe()
                ))
            };

            let locator = match &entry.target {
                FieldTarget::Text(name) => {
                    if fillable.is_none() {
                        match collect_fillable_fields(page).await {
                            Ok(found) => fillable = Some(found),
                            Err(e) => return discovery_failure(e),
                        }
                    }
                    let known = fillable.as_deref().unwrap_or_default();
                    match find_field_by_name(known, name) {
                        Some(field) => Locator::css(&field.selector),
                        None => return missing(),
                    }
                }
                FieldTarget::Selector(selector) => {
                    let locator = Locator::css(selector);
                    if page.count(&locator).await.unwrap_or(0) == 0 {
                        return missing();
                    }
                    locator
                }
                FieldTarget::Index(index) => {
                    if let Err(failure) = self.ensure_cache(page).await {
                        return failure;
                    }
                    match self.cache.get(*index) {
                        Some(item) => Locator::css(&item.selector),
                        None => return missing(),
                    }
                }
            };

            if !fill_by_locator(page, &locator, &entry.value, self.timeouts.visible).await {
                return DispatchResult::fail(format!(
                    "Failed to set value for target: {}",
                    entry.target.describe()
                ));
            }
        }

        let items = match collect_interactive_items(page).await {
            Ok(items) => items,
            Err(e) => return discovery_failure(e),
        };
        let wanted = normalize_text(submit_text);
        let Some(submit) = items.into_iter().find(|item| {
            let text = normalize_text(&item.text);
            SUBMIT_TAGS.contains(&item.tag.as_str())
                && !text.is_empty()
                && (text.contains(&wanted) || wanted.contains(&text))
        }) else {
            return DispatchResult::fail(format!(
                "No submit button found with text: {}",
                submit_text
            ));
        };

        let locator = Locator::css(&submit.selector);
        self.click_locator(
            page,
            &locator,
            metadata(json!({
                "mode": "input",
                "fields": fields,
                "submitText": submit_text,
                "matchedSubmit": submit,
            })),
        )
        .await
    }

    pub async fn wait(&self, page: &dyn PageDriver, target: &WaitTarget) -> DispatchResult {
        let started = Instant::now();
        let timeout = Duration::from_millis(target.timeout_ms());
        let failed = || {
            DispatchResult::fail(format!(
                "Wait failed for {}. Timeout: {}ms",
                target.mode(),
                target.timeout_ms()
            ))
        };

        match target {
            WaitTarget::Url {
                pattern,
                timeout_ms,
            } => {
                let needle = pattern.to_lowercase();
                if page
                    .wait_for_condition(URL_CONTAINS_JS, vec![json!(needle)], timeout)
                    .await
                    .is_err()
                {
                    return failed();
                }
                let current_url = page.current_url().await.unwrap_or_default();
                DispatchResult::ok_with_data(
                    format!("Waited for URL pattern: {}", pattern),
                    json!({
                        "mode": "url",
                        "pattern": pattern,
                        "timeoutMs": timeout_ms,
                        "elapsedMs": started.elapsed().as_millis() as u64,
                        "currentUrl": current_url,
                    }),
                )
            }
            WaitTarget::Selector {
                selector,
                state,
                timeout_ms,
            } => {
                let locator = Locator::css(selector);
                if page.wait_for(&locator, *state, timeout).await.is_err() {
                    return failed();
                }
                let elapsed = started.elapsed().as_millis() as u64;
                let matched_count = page.count(&locator).await.unwrap_or(0);
                DispatchResult::ok_with_data(
                    format!("Waited for selector: {}", selector),
                    json!({
                        "mode": "selector",
                        "selector": selector,
                        "state": state.as_str(),
                        "timeoutMs": timeout_ms,
                        "elapsedMs": elapsed,
                        "matchedCount": matched_count,
                    }),
                )
            }
        }
    }

    /// Shared click path: resolve, make actionable, click with fallback, then report
    /// navigation and popups.
    async fn click_locator(
        &mut self,
        page: &dyn PageDriver,
        locator: &Locator,
        mut details: Map<String, Value>,
    ) -> DispatchResult {
        let count = page.count(locator).await.unwrap_or(0);
        if count == 0 {
            return DispatchResult::fail("No matching interactive element was found");
        }

        let actionable = match page.scroll_into_view(locator).await {
            Ok(()) => page
                .wait_for(locator, ElementState::Visible, self.timeouts.visible)
                .await
                .is_ok(),
            Err(_) => false,
        };
        if !actionable {
            return DispatchResult::fail("Element exists but is not visible/actionable");
        }

        let old_url = page.current_url().await.unwrap_or_default();
        let known_pages = page.page_handles().await.unwrap_or_default();

        let (popup, clicked) = tokio::join!(
            page.wait_for_new_page(&known_pages, self.timeouts.popup),
            press(page, locator, self.timeouts.click),
        );
        if !clicked {
            return DispatchResult::fail("Click failed for the matched element");
        }

        // Pages that never reach DOM-ready are still reported as clicked
        if let Err(e) = page.wait_for_dom_ready(self.timeouts.dom_ready).await {
            debug!("Ignoring DOM-ready wait after click: {}", e);
        }

        let popup_url = match &popup {
            Some(handle) => page.page_url(handle, self.timeouts.dom_ready).await.ok(),
            None => None,
        };
        let new_url = page
            .current_url()
            .await
            .unwrap_or_else(|_| old_url.clone());
        let navigated = old_url != new_url;
        if navigated {
            self.cache.invalidate();
        }

        details.insert("matchedCount".into(), json!(count));
        details.insert("navigated".into(), json!(navigated));
        details.insert("oldUrl".into(), json!(old_url));
        details.insert("newUrl".into(), json!(new_url));
        details.insert("openedPopup".into(), json!(popup.is_some()));
        details.insert("popupUrl".into(), json!(popup_url));

        DispatchResult::ok_with_data("Action successful", Value::Object(details))
    }
}

/// Native click, falling back to a programmatic one
async fn press(page: &dyn PageDriver, locator: &Locator, timeout: Duration) -> bool {
    match page.click(locator, timeout).await {
        Ok(()) => true,
        Err(e) => {
            debug!("Native click failed ({}), dispatching click event", e);
            page.dispatch_click(locator).await.is_ok()
        }
    }
}

fn metadata(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
#[path = "interaction_test.rs"]
mod interaction_test;
