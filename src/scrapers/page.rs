use crate::error::ScrapeError;
use scraper::{ElementRef, Html, Selector};

pub fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector {
        selector: css.to_string(),
    })
}

/// Trimmed text content of an element and all its descendants
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// A parsed page that answers CSS selector queries
pub struct Page {
    raw: String,
    document: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            raw: html.to_string(),
            document: Html::parse_document(html),
        }
    }

    /// True if the raw page content contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.raw.contains(needle)
    }

    /// All elements matching `css`, in document order
    pub fn select_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>, ScrapeError> {
        let sel = selector(css)?;
        Ok(self.document.select(&sel).collect())
    }

    /// Text of the first element matching `css`
    pub fn select_text(&self, css: &str) -> Result<Option<String>, ScrapeError> {
        let sel = selector(css)?;
        Ok(self.document.select(&sel).next().map(element_text))
    }

    /// Attribute of the first element matching `css`
    pub fn select_attr(&self, css: &str, attr: &str) -> Result<Option<String>, ScrapeError> {
        let sel = selector(css)?;
        Ok(self
            .document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <html><body>
            <h1 class="title">  Golf <b>7</b> </h1>
            <a class="link" href="/auto/1">first</a>
            <a class="link" href="/auto/2">second</a>
        </body></html>
    "#;

    #[test]
    fn select_text_joins_descendants_and_trims() {
        let page = Page::parse(HTML);
        assert_eq!(page.select_text(".title").unwrap().as_deref(), Some("Golf 7"));
        assert_eq!(page.select_text(".missing").unwrap(), None);
    }

    #[test]
    fn select_attr_reads_first_match() {
        let page = Page::parse(HTML);
        assert_eq!(
            page.select_attr("a.link", "href").unwrap().as_deref(),
            Some("/auto/1")
        );
        assert_eq!(page.select_all("a.link").unwrap().len(), 2);
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let page = Page::parse(HTML);
        assert!(matches!(
            page.select_text("a[[").unwrap_err(),
            ScrapeError::Selector { .. }
        ));
    }
}
