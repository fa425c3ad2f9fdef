use crate::error::ScrapeError;
use crate::models::{CarDetail, DetailField};
use crate::scrapers::page::{element_text, Page};
use crate::scrapers::traits::PageDriver;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Text that only shows up on anti-bot challenge pages
pub const BLOCK_MARKERS: &[&str] = &["ShieldSquare Captcha", "Robot ne smije naškoditi čovjeku"];

pub const LOCATION_PREFIX: &str = "Lokacija vozila:";

/// Labels of the basic details list and the attribute each one fills
pub const DETAIL_LABELS: &[(&str, DetailField)] = &[
    ("Lokacija vozila", DetailField::Location),
    ("Marka automobila", DetailField::Brand),
    ("Model automobila", DetailField::Model),
    ("Tip automobila", DetailField::Type),
    ("Godina proizvodnje", DetailField::Year),
    ("Godina modela", DetailField::ModelYear),
    ("Prijeđeni kilometri", DetailField::Mileage),
    ("Motor", DetailField::Engine),
    ("Snaga motora", DetailField::Power),
    ("Radni obujam", DetailField::Displacement),
    ("Mjenjač", DetailField::Gearbox),
    ("Broj stupnjeva", DetailField::Gears),
    ("Stanje", DetailField::Condition),
    ("Servisna knjiga", DetailField::ServiceBook),
];

const TITLE_SELECTOR: &str = ".ClassifiedDetailSummary-title";
const PRICE_SELECTOR: &str = ".price--hrk, .price--eur, .ClassifiedDetailSummary-price--eur";
const LOCATION_SELECTOR: &str = ".ClassifiedDetailSummary-address, .entity-description-item--location, .entity-description-main .entity-description-item";
const DETAILS_SELECTOR: &str =
    ".ClassifiedDetailBasicDetails-list dt, .ClassifiedDetailBasicDetails-list dd";

pub fn field_for_label(label: &str) -> Option<DetailField> {
    DETAIL_LABELS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, field)| *field)
}

fn strip_location_prefix(location: &str) -> String {
    location.replacen(LOCATION_PREFIX, "", 1).trim().to_string()
}

/// Build a [`CarDetail`] from the HTML of a listing page
pub fn parse_detail_page(url: &str, html: &str) -> Result<CarDetail, ScrapeError> {
    let page = Page::parse(html);

    if let Some(marker) = BLOCK_MARKERS.iter().find(|m| page.contains(m)) {
        return Err(ScrapeError::ExtractionBlocked {
            url: url.to_string(),
            marker: marker.to_string(),
        });
    }

    let mut detail = CarDetail::new(url);
    detail.title = page.select_text(TITLE_SELECTOR)?.unwrap_or_default();
    detail.price = page.select_text(PRICE_SELECTOR)?.unwrap_or_default();
    detail.location = page
        .select_text(LOCATION_SELECTOR)?
        .map(|loc| strip_location_prefix(&loc))
        .unwrap_or_default();

    // dt/dd come back interleaved in document order
    let items = page.select_all(DETAILS_SELECTOR)?;
    for pair in items.chunks_exact(2) {
        let label = element_text(pair[0]);
        let value = element_text(pair[1]);
        match field_for_label(&label) {
            Some(DetailField::Location) => detail.location = strip_location_prefix(&value),
            Some(field) => *detail.field_mut(field) = value,
            None => debug!(label = %label, "Ignoring unknown detail label"),
        }
    }

    Ok(detail)
}

/// Loads a listing page and turns it into a [`CarDetail`]
pub struct DetailExtractor<'a, D: PageDriver> {
    driver: &'a D,
    debug_dir: Option<PathBuf>,
}

impl<'a, D: PageDriver> DetailExtractor<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self {
            driver,
            debug_dir: None,
        }
    }

    /// Save the HTML of blocked pages under `dir`
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    pub async fn extract(&self, url: &str) -> Result<CarDetail, ScrapeError> {
        let html = self.driver.fetch_html(url).await.map_err(|e| match e {
            ScrapeError::PageFetch { url, message } => ScrapeError::Extraction { url, message },
            other => other,
        })?;

        let result = parse_detail_page(url, &html);
        if let Err(ScrapeError::ExtractionBlocked { .. }) = &result {
            self.capture_blocked_page(&html).await;
        }
        result
    }

    async fn capture_blocked_page(&self, html: &str) {
        let Some(dir) = &self.debug_dir else {
            return;
        };

        let path = dir.join(format!("blocked_{}.html", Utc::now().format("%Y%m%d_%H%M%S%3f")));
        let written: std::io::Result<()> = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, html).await
        }
        .await;

        match written {
            Ok(()) => info!(path = %path.display(), "Saved blocked page HTML"),
            Err(e) => warn!(path = %path.display(), error = %e, "Could not save blocked page HTML"),
        }
    }
}
