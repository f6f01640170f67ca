//! Browser session management.

use crate::error::{BrowserError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use halberd_core::config::BrowserConfig as SessionConfig;

/// A running browser instance that hands out pages for auditing.
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Launch a browser with default settings (headless, 1920x1080).
    pub async fn launch() -> Result<Self> {
        Self::launch_with(&SessionConfig::default()).await
    }

    /// Launch a browser with specific settings.
    pub async fn launch_with(config: &SessionConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        tracing::info!(
            headless = config.headless,
            width = config.window_width,
            height = config.window_height,
            "browser session started"
        );

        Ok(Self { browser })
    }

    /// Open a new page at the given URL.
    pub async fn page(&self, url: &str) -> Result<Page> {
        tracing::debug!(url = %url, "opening page");
        self.browser
            .new_page(url)
            .await
            .map_err(|e| BrowserError::NavigationError(e.to_string()))
    }

    /// Open a blank page, for callers that set content directly.
    pub async fn blank_page(&self) -> Result<Page> {
        self.page("about:blank").await
    }

    /// Close the browser and wait for the process to exit.
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        self.browser
            .wait()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }
}
