use crate::error::ScrapeError;
use async_trait::async_trait;

/// Anything that can load a URL and hand back the rendered page.
/// Selector queries are answered on the returned HTML, see [`crate::scrapers::page::Page`].
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to `url` and return the page's HTML
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError>;
}
