use crate::config::{ACCEPT_LANGUAGE, USER_AGENT};
use crate::error::ScrapeError;
use crate::scrapers::traits::PageDriver;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use tracing::{debug, info};

/// Page driver backed by headless Chrome, reusing a single tab for every page
pub struct ChromeDriver {
    // keeps the Chrome process alive for as long as the tab is in use
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    /// Launch headless Chrome and open the working tab
    pub fn launch() -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_user_agent(USER_AGENT, Some(ACCEPT_LANGUAGE), None)
            .context("Failed to set user agent")?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    fn load(tab: &Tab, url: &str) -> Result<String> {
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;

        let html_result = tab.evaluate("document.documentElement.outerHTML", false)?;
        let html = html_result
            .value
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();

        debug!(url, bytes = html.len(), "Downloaded page HTML");
        Ok(html)
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let tab = Arc::clone(&self.tab);
        let target = url.to_string();

        let loaded = tokio::task::spawn_blocking(move || Self::load(&tab, &target)).await;

        match loaded {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(e)) => Err(ScrapeError::PageFetch {
                url: url.to_string(),
                message: format!("{e:#}"),
            }),
            Err(e) => Err(ScrapeError::PageFetch {
                url: url.to_string(),
                message: format!("browser task failed: {e}"),
            }),
        }
    }
}
