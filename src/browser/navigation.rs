use std::path::PathBuf;

use serde_json::json;
use tracing::{info, warn};
use url::Url;

use super::artifact_stem;
use crate::dispatch::DispatchResult;
use crate::driver::{LoadResponse, PageDriver};
use crate::parser::navigate::{PROTOCOL_ERROR, is_http_scheme};
use crate::types::is_absolute_http_url;

/// Page loads, history, page queries and page artifacts
pub struct NavigationService {
    output_dir: PathBuf,
}

impl NavigationService {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub async fn navigate(&self, page: &dyn PageDriver, url: &str) -> DispatchResult {
        let response = match page.goto(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Navigation to {} failed: {}", url, e);
                return DispatchResult::fail(format!("Failed to navigate to {}", url));
            }
        };

        let Some(response) = response else {
            return DispatchResult::fail(format!("Failed to navigate to {}", url));
        };
        if let Some(failure) = check_response(&response) {
            return failure.for_action(&format!("Failed to navigate to {}", url));
        }

        let final_url = page
            .current_url()
            .await
            .unwrap_or_else(|_| url.to_string());
        info!("Loaded {}", final_url);
        DispatchResult::ok_with_data(format!("Navigate to {}", url), json!({ "url": final_url }))
    }

    /// Navigate to an absolute URL or a path resolved against the current page
    pub async fn open(&self, page: &dyn PageDriver, target: &str) -> DispatchResult {
        let target = target.trim();
        if is_absolute_http_url(target) {
            return self.navigate(page, target).await;
        }

        // A fresh session sits on about:blank (Firefox) or data:, (Chrome)
        let base = page
            .current_url()
            .await
            .ok()
            .and_then(|current| Url::parse(&current).ok())
            .filter(is_http_scheme);
        let Some(base) = base else {
            return DispatchResult::fail(
                "Cannot resolve relative path before loading a page. Use navigate first.",
            );
        };

        let resolved = match base.join(target) {
            Ok(resolved) => resolved,
            Err(_) => {
                return DispatchResult::fail(format!("Failed to resolve target path: {}", target));
            }
        };
        if !is_http_scheme(&resolved) {
            return DispatchResult::fail(PROTOCOL_ERROR);
        }

        self.navigate(page, resolved.as_str()).await
    }

    pub async fn show_code(&self, page: &dyn PageDriver, file_name: &str) -> DispatchResult {
        let markup = match page.content().await {
            Ok(markup) => markup,
            Err(e) => {
                warn!("Could not read page markup: {}", e);
                return DispatchResult::fail("Failed to save HTML to file");
            }
        };

        let stem = artifact_stem(file_name);
        let path = self.output_dir.join(format!("{}.html", stem));
        if let Err(e) = tokio::fs::write(&path, markup).await {
            warn!("Could not write {}: {}", path.display(), e);
            return DispatchResult::fail("Failed to save HTML to file");
        }

        DispatchResult::ok(format!("Check {}.html, you'll find code there.", stem))
    }

    pub async fn move_back(&self, page: &dyn PageDriver) -> DispatchResult {
        match page.go_back().await {
            Ok(true) => DispatchResult::ok("Moved back successfully"),
            _ => DispatchResult::fail("Cannot move back from the current page"),
        }
    }

    pub async fn move_forward(&self, page: &dyn PageDriver) -> DispatchResult {
        match page.go_forward().await {
            Ok(true) => DispatchResult::ok("Moved forward successfully"),
            _ => DispatchResult::fail("Cannot move forward from the current page"),
        }
    }

    pub async fn reload(&self, page: &dyn PageDriver) -> DispatchResult {
        let response = match page.reload().await {
            Ok(Some(response)) => response,
            Ok(None) | Err(_) => return DispatchResult::fail("Failed to reload the current page"),
        };
        if let Some(failure) = check_response(&response) {
            return failure.for_action("Failed to reload the current page");
        }
        DispatchResult::ok("Reloaded current page successfully")
    }

    pub async fn current_url(&self, page: &dyn PageDriver) -> DispatchResult {
        match page.current_url().await {
            Ok(url) => DispatchResult::ok_with_data("Current URL", json!(url)),
            Err(e) => DispatchResult::fail(format!("Failed to read the current URL: {}", e)),
        }
    }

    pub async fn current_title(&self, page: &dyn PageDriver) -> DispatchResult {
        match page.title().await {
            Ok(title) => DispatchResult::ok_with_data("Current title", json!(title)),
            Err(e) => DispatchResult::fail(format!("Failed to read the current title: {}", e)),
        }
    }

    pub async fn screenshot(&self, page: &dyn PageDriver, file_name: &str) -> DispatchResult {
        let stem = artifact_stem(file_name);
        let path = self.output_dir.join(format!("{}.png", stem));
        if let Err(e) = page.screenshot(&path).await {
            warn!("Screenshot to {} failed: {}", path.display(), e);
            return DispatchResult::fail("Failed to take screenshot");
        }
        DispatchResult::ok(format!("Screenshot saved to {}.png", stem))
    }
}

enum LoadFailure {
    Finished(String),
    NotOk,
}

impl LoadFailure {
    fn for_action(self, prefix: &str) -> DispatchResult {
        match self {
            LoadFailure::Finished(error) => {
                DispatchResult::fail(format!("{}. Here's the error: {}", prefix, error))
            }
            LoadFailure::NotOk => DispatchResult::fail("Website response was not successful"),
        }
    }
}

fn check_response(response: &LoadResponse) -> Option<LoadFailure> {
    if let Some(error) = &response.finished_error {
        return Some(LoadFailure::Finished(error.clone()));
    }
    if !response.ok() {
        return Some(LoadFailure::NotOk);
    }
    None
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;
