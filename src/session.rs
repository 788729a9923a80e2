use serde::{Deserialize, Serialize};

/// Console-lifetime view of the browser session.
///
/// Only the executor mutates it, and only after a successful navigate or open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub browser_started: bool,
    pub page_loaded: bool,
    pub current_url: Option<String>,
}

/// Readiness derived from [`SessionState::page_loaded`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NoPage,
    PageLoaded,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readiness(&self) -> Readiness {
        if self.page_loaded {
            Readiness::PageLoaded
        } else {
            Readiness::NoPage
        }
    }

    /// Record a page load that just succeeded
    pub fn mark_loaded(&mut self, url: impl Into<String>) {
        self.browser_started = true;
        self.page_loaded = true;
        self.current_url = Some(url.into());
    }
}
