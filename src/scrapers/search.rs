use crate::config::{Pacing, MAX_SEARCH_PAGES};
use crate::error::ScrapeError;
use crate::models::AdReference;
use crate::scrapers::page::{element_text, selector, Page};
use crate::scrapers::traits::PageDriver;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

const ITEM_SELECTOR: &str = ".EntityList-item--Regular";
const LINK_SELECTOR: &str = ".entity-title a";
const PRICE_SELECTOR: &str = ".price--eur, .price--hrk, .entity-price .price";
const NEXT_PAGE_SELECTOR: &str = ".Pagination-item--next a";

/// Ads and the next-page link found on one search results page
#[derive(Debug, Default)]
pub struct SearchPage {
    pub ads: Vec<AdReference>,
    pub next_url: Option<String>,
}

/// Resolve a possibly relative link against the site origin.
/// Absolute and relative links go through the same normalisation so one listing has one key.
pub fn resolve_url(base_url: &str, href: &str) -> String {
    let absolute = href.starts_with("http");
    let parsed = if absolute {
        Url::parse(href)
    } else {
        Url::parse(base_url).and_then(|base| base.join(href))
    };

    match parsed {
        Ok(u) => u.to_string(),
        Err(_) if absolute => href.to_string(),
        Err(_) => format!("{}{}", base_url.trim_end_matches('/'), href),
    }
}

/// Extract listing links, list prices and the next-page link from search page HTML
pub fn parse_search_page(html: &str, base_url: &str) -> Result<SearchPage, ScrapeError> {
    let page = Page::parse(html);
    let link_selector = selector(LINK_SELECTOR)?;
    let price_selector = selector(PRICE_SELECTOR)?;

    let mut ads = Vec::new();
    for item in page.select_all(ITEM_SELECTOR)? {
        let Some(href) = item
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
            .filter(|href| !href.is_empty())
        else {
            continue;
        };

        let price = item
            .select(&price_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();

        ads.push(AdReference::new(resolve_url(base_url, href), price));
    }

    let next_url = page
        .select_attr(NEXT_PAGE_SELECTOR, "href")?
        .filter(|href| !href.is_empty())
        .map(|href| resolve_url(base_url, &href));

    Ok(SearchPage { ads, next_url })
}

/// Walks the paginated search results
pub struct SearchCrawler<'a, D: PageDriver> {
    driver: &'a D,
    base_url: String,
    page_delay: Duration,
    max_pages: usize,
}

impl<'a, D: PageDriver> SearchCrawler<'a, D> {
    pub fn new(driver: &'a D, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
            page_delay: Pacing::default().search_page_delay,
            max_pages: MAX_SEARCH_PAGES,
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    async fn fetch_page(&self, url: &str) -> Result<SearchPage, ScrapeError> {
        let html = self.driver.fetch_html(url).await?;
        parse_search_page(&html, &self.base_url)
    }

    /// Follow next-page links from `start_url` and collect every unique ad, in traversal order.
    /// A failing page ends the crawl; whatever was collected up to then is returned.
    pub async fn crawl(&self, start_url: &str) -> Vec<AdReference> {
        let mut ads: Vec<AdReference> = Vec::new();
        let mut seen_ads = HashSet::new();
        let mut visited_pages = HashSet::new();
        let mut current = Some(resolve_url(&self.base_url, start_url));
        let mut page_num = 1;

        while let Some(url) = current.take() {
            if page_num > self.max_pages {
                warn!(max_pages = self.max_pages, "Reached search page limit, stopping");
                break;
            }
            if !visited_pages.insert(url.clone()) {
                warn!(url = %url, "Next page link points back to a visited page, stopping");
                break;
            }

            info!(page = page_num, url = %url, "Navigating to search page");
            let search_page = match self.fetch_page(&url).await {
                Ok(p) => p,
                Err(e) => {
                    error!(page = page_num, url = %url, error = %e, "Error scraping search page");
                    break;
                }
            };

            let found = search_page.ads.len();
            for ad in search_page.ads {
                if seen_ads.insert(ad.url.clone()) {
                    ads.push(ad);
                } else {
                    debug!(url = %ad.url, "Skipping duplicate ad");
                }
            }
            info!(page = page_num, found, total = ads.len(), "Collected ads from search page");

            if let Some(next) = search_page.next_url {
                current = Some(next);
                page_num += 1;
                tokio::time::sleep(self.page_delay).await;
            }
        }

        ads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.njuskalo.hr";

    fn search_html(items: &[(&str, &str)], next: Option<&str>) -> String {
        let mut html = String::from("<html><body><ul>");
        for (href, price) in items {
            html.push_str(&format!(
                r#"<li class="EntityList-item--Regular">
                    <h3 class="entity-title"><a href="{href}">Car</a></h3>
                    <div class="entity-price"><strong class="price">{price}</strong></div>
                </li>"#
            ));
        }
        html.push_str("</ul>");
        if let Some(next) = next {
            html.push_str(&format!(
                r#"<ul><li class="Pagination-item--next"><a href="{next}">Sljedeća</a></li></ul>"#
            ));
        }
        html.push_str("</body></html>");
        html
    }

    #[test]
    fn resolves_relative_and_keeps_absolute_links() {
        assert_eq!(
            resolve_url(BASE, "/auti/vw-tiguan-oglas-1"),
            "https://www.njuskalo.hr/auti/vw-tiguan-oglas-1"
        );
        assert_eq!(
            resolve_url(BASE, "https://other.example/x"),
            "https://other.example/x"
        );
    }

    #[test]
    fn absolute_and_relative_forms_give_the_same_key() {
        let relative = resolve_url(BASE, "/auti/vw golf-čisti-oglas-7");
        let absolute = resolve_url(BASE, "https://www.njuskalo.hr/auti/vw golf-čisti-oglas-7");
        assert_eq!(relative, absolute);
        assert_eq!(
            absolute,
            "https://www.njuskalo.hr/auti/vw%20golf-%C4%8Disti-oglas-7"
        );
    }

    #[test]
    fn crawler_defaults_come_from_config() {
        struct NoPages;

        #[async_trait::async_trait]
        impl PageDriver for NoPages {
            async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
                Err(ScrapeError::PageFetch {
                    url: url.to_string(),
                    message: "offline".to_string(),
                })
            }
        }

        let crawler = SearchCrawler::new(&NoPages, BASE);
        assert_eq!(crawler.page_delay, Pacing::default().search_page_delay);
        assert_eq!(crawler.max_pages, crate::config::Settings::default().max_pages);
    }

    #[test]
    fn parses_items_prices_and_next_link() {
        let html = search_html(
            &[("/auti/a", " 12.500 € "), ("https://www.njuskalo.hr/auti/b", "")],
            Some("/search/?page=2"),
        );

        let page = parse_search_page(&html, BASE).unwrap();
        assert_eq!(
            page.ads,
            vec![
                AdReference::new("https://www.njuskalo.hr/auti/a", "12.500 €"),
                AdReference::new("https://www.njuskalo.hr/auti/b", ""),
            ]
        );
        assert_eq!(
            page.next_url.as_deref(),
            Some("https://www.njuskalo.hr/search/?page=2")
        );
    }

    #[test]
    fn items_without_link_are_skipped() {
        let html = r#"<html><body>
            <li class="EntityList-item--Regular"><h3 class="entity-title">No link</h3></li>
            <li class="EntityList-item--Regular"><h3 class="entity-title"><a href="">Empty</a></h3></li>
        </body></html>"#;

        let page = parse_search_page(html, BASE).unwrap();
        assert!(page.ads.is_empty());
        assert!(page.next_url.is_none());
    }

    #[test]
    fn empty_next_href_means_last_page() {
        let html = search_html(&[("/auti/a", "1 €")], Some(""));
        let page = parse_search_page(&html, BASE).unwrap();
        assert!(page.next_url.is_none());
    }
}
