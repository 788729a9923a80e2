//! Browser facade: the [`BrowserController`] the executor drives.
//!
//! The page is created lazily on first use. Concurrent first callers share one
//! in-flight launch. Navigation-type successes drop the element-id cache.

pub mod cache;
pub mod discovery;
pub mod interaction;
pub mod navigation;

#[cfg(test)]
pub(crate) mod test_driver;

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};

use crate::config::ConsoleConfig;
use crate::dispatch::{BrowserController, ControllerResult, DispatchResult};
use crate::driver::{PageDriver, PageLauncher};
use crate::errors::ConsoleError;
use crate::intent::{ClickTarget, FieldEntry, WaitTarget};

pub use interaction::{InteractionService, NO_CACHE_ERROR};
pub use navigation::NavigationService;

/// File stem for a user-given artifact name: the leading `--` is dropped
pub fn artifact_stem(file_name: &str) -> &str {
    file_name.strip_prefix("--").unwrap_or(file_name)
}

pub struct BrowserFacade {
    launcher: Box<dyn PageLauncher>,
    page: OnceCell<Box<dyn PageDriver>>,
    navigation: NavigationService,
    interaction: Mutex<InteractionService>,
}

impl BrowserFacade {
    pub fn new(launcher: Box<dyn PageLauncher>, config: &ConsoleConfig) -> Self {
        Self {
            launcher,
            page: OnceCell::new(),
            navigation: NavigationService::new(config.output_dir.clone()),
            interaction: Mutex::new(InteractionService::new(
                config.timeouts,
                config.output_dir.clone(),
            )),
        }
    }

    /// The live page, launching it on first use
    pub async fn page(&self) -> Result<&dyn PageDriver, ConsoleError> {
        let page = self
            .page
            .get_or_try_init(|| async {
                info!("Starting browser page");
                self.launcher.launch().await
            })
            .await
            .map_err(ConsoleError::from)?;
        Ok(&**page)
    }

    async fn forget_elements_on_success(&self, result: &DispatchResult) {
        if result.is_success() {
            self.interaction.lock().await.clear_cache();
        }
    }
}

#[async_trait]
impl BrowserController for BrowserFacade {
    async fn navigate(&self, url: &str) -> ControllerResult {
        let page = self.page().await?;
        let result = self.navigation.navigate(page, url).await;
        self.forget_elements_on_success(&result).await;
        Ok(result)
    }

    async fn open(&self, target: &str) -> ControllerResult {
        let page = self.page().await?;
        let result = self.navigation.open(page, target).await;
        self.forget_elements_on_success(&result).await;
        Ok(result)
    }

    async fn show_code(&self, file_name: &str) -> ControllerResult {
        let page = self.page().await?;
        Ok(self.navigation.show_code(page, file_name).await)
    }

    async fn show_elements(&self, file_name: Option<&str>) -> ControllerResult {
        let page = self.page().await?;
        let mut interaction = self.interaction.lock().await;
        Ok(interaction.show_elements(page, file_name).await)
    }

    async fn input(&self, fields: &[FieldEntry], submit_text: &str) -> ControllerResult {
        let page = self.page().await?;
        let mut interaction = self.interaction.lock().await;
        Ok(interaction.input(page, fields, submit_text).await)
    }

    async fn click(&self, target: &ClickTarget) -> ControllerResult {
        let page = self.page().await?;
        let mut interaction = self.interaction.lock().await;
        Ok(interaction.click(page, target).await)
    }

    async fn links(&self, filter: Option<&str>) -> ControllerResult {
        let page = self.page().await?;
        let mut interaction = self.interaction.lock().await;
        Ok(interaction.links(page, filter).await)
    }

    async fn follow(&self, pattern: &str) -> ControllerResult {
        let page = self.page().await?;
        let mut interaction = self.interaction.lock().await;
        Ok(interaction.follow(page, &self.navigation, pattern).await)
    }

    async fn act(&self, id: usize) -> ControllerResult {
        let mut interaction = self.interaction.lock().await;
        // Answered from the cache alone, without touching the page
        if interaction.cache().is_empty() {
            return Ok(DispatchResult::fail(NO_CACHE_ERROR));
        }
        let page = self.page().await?;
        Ok(interaction.act(page, &self.navigation, id).await)
    }

    async fn wait(&self, target: &WaitTarget) -> ControllerResult {
        let page = self.page().await?;
        let interaction = self.interaction.lock().await;
        Ok(interaction.wait(page, target).await)
    }

    async fn move_back(&self) -> ControllerResult {
        let page = self.page().await?;
        let result = self.navigation.move_back(page).await;
        self.forget_elements_on_success(&result).await;
        Ok(result)
    }

    async fn move_forward(&self) -> ControllerResult {
        let page = self.page().await?;
        let result = self.navigation.move_forward(page).await;
        self.forget_elements_on_success(&result).await;
        Ok(result)
    }

    async fn reload(&self) -> ControllerResult {
        let page = self.page().await?;
        let result = self.navigation.reload(page).await;
        self.forget_elements_on_success(&result).await;
        Ok(result)
    }

    async fn current_url(&self) -> ControllerResult {
        let page = self.page().await?;
        Ok(self.navigation.current_url(page).await)
    }

    async fn current_title(&self) -> ControllerResult {
        let page = self.page().await?;
        Ok(self.navigation.current_title(page).await)
    }

    async fn screenshot(&self, file_name: &str) -> ControllerResult {
        let page = self.page().await?;
        Ok(self.navigation.screenshot(page, file_name).await)
    }

    async fn close(&mut self) -> Result<(), ConsoleError> {
        if let Some(page) = self.page.take() {
            info!("Closing browser page");
            if let Err(e) = page.close().await {
                warn!("Failed to close page cleanly: {}", e);
            }
        }
        self.interaction.get_mut().clear_cache();
        Ok(())
    }
}
