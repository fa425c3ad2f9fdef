use crate::config::{Pacing, Settings};
use crate::filter::{CarFilter, RejectionTally};
use crate::models::{AdReference, CarDetail};
use crate::notify::Notifier;
use crate::scrapers::{DetailExtractor, PageDriver, SearchCrawler};
use crate::store::{save_results, ProcessedUrlStore};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;
use tracing::{error, info, warn};

/// What a run did
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Unique ads on the search pages
    pub ads_found: usize,
    /// Ads not processed by an earlier run
    pub new_ads: usize,
    pub extracted: usize,
    pub failed: usize,
    pub rejections: RejectionTally,
    /// Cars that passed the filter, power already in HP
    pub matches: Vec<CarDetail>,
    pub notified: usize,
}

impl RunSummary {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            ads_found: 0,
            new_ads: 0,
            extracted: 0,
            failed: 0,
            rejections: RejectionTally::default(),
            matches: Vec::new(),
            notified: 0,
        }
    }
}

fn detail_delay(pacing: &Pacing) -> Duration {
    let jitter_ms = pacing.detail_delay_jitter.as_millis() as u64;
    let extra = if jitter_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..jitter_ms)
    };
    pacing.detail_delay_min + Duration::from_millis(extra)
}

/// One crawl → extract → filter → persist → notify pass
pub struct Pipeline<'a, D: PageDriver> {
    driver: &'a D,
    settings: Settings,
    filter: CarFilter,
    notifier: Notifier,
}

impl<'a, D: PageDriver> Pipeline<'a, D> {
    pub fn new(driver: &'a D, settings: Settings, notifier: Notifier) -> Self {
        Self {
            driver,
            settings,
            filter: CarFilter::default(),
            notifier,
        }
    }

    /// Run once against an already loaded processed-URL set.
    /// Failures past this point are logged and the run carries on.
    pub async fn run(&self, mut store: ProcessedUrlStore) -> RunSummary {
        let mut summary = RunSummary::new(Utc::now());

        let crawler = SearchCrawler::new(self.driver, self.settings.base_url.clone())
            .with_page_delay(self.settings.pacing.search_page_delay)
            .with_max_pages(self.settings.max_pages);
        let ads = crawler.crawl(&self.settings.search_url).await;
        summary.ads_found = ads.len();

        let new_ads: Vec<AdReference> = ads
            .into_iter()
            .filter(|ad| !store.contains(&ad.url))
            .collect();
        summary.new_ads = new_ads.len();
        info!(found = summary.ads_found, new = summary.new_ads, "Search finished");

        if new_ads.is_empty() {
            info!("No new ads found. Exiting.");
            summary.finished_at = Utc::now();
            return summary;
        }

        info!("Processing {} new ads...", new_ads.len());
        let cars = self.extract_all(&new_ads, &mut store, &mut summary).await;

        let outcome = self.filter.apply(cars);
        summary.rejections = outcome.rejections;
        summary.matches = outcome.passed;

        if let Err(e) = save_results(&self.settings.results_file, &summary.matches).await {
            error!(error = %e, "Error saving results");
        }
        if let Err(e) = store.save().await {
            error!(error = %e, "Error updating processed URLs");
        }

        summary.notified = self.notify(&summary.matches).await;
        summary.finished_at = Utc::now();
        summary
    }

    async fn extract_all(
        &self,
        ads: &[AdReference],
        store: &mut ProcessedUrlStore,
        summary: &mut RunSummary,
    ) -> Vec<CarDetail> {
        let extractor =
            DetailExtractor::new(self.driver).with_debug_dir(self.settings.debug_dir.clone());
        let checkpoint_every = self.settings.checkpoint_every.max(1);
        let mut cars = Vec::new();

        for (i, ad) in ads.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(detail_delay(&self.settings.pacing)).await;
            }

            info!("[{}/{}] Scraping detail: {}", i + 1, ads.len(), ad.url);
            let mut car = match extractor.extract(&ad.url).await {
                Ok(car) => car,
                Err(e) => {
                    // left unmarked so the next run retries it
                    warn!(url = %ad.url, error = %e, "Skipping ad");
                    summary.failed += 1;
                    continue;
                }
            };

            if car.price.is_empty() {
                car.price = ad.price.clone();
            }
            store.insert(ad.url.clone());
            cars.push(car);
            summary.extracted += 1;

            if summary.extracted % checkpoint_every == 0 {
                match store.save().await {
                    Ok(()) => info!(processed = store.len(), "Checkpoint saved"),
                    Err(e) => error!(error = %e, "Checkpoint save failed"),
                }
            }
        }

        cars
    }

    async fn notify(&self, cars: &[CarDetail]) -> usize {
        if cars.is_empty() {
            return 0;
        }
        if !self.notifier.is_configured() {
            info!(cars = cars.len(), "Notifications not configured, skipping");
            return 0;
        }

        let mut sent = 0;
        for car in cars {
            match self.notifier.send_car(car).await {
                Ok(()) => sent += 1,
                Err(e) => error!(url = %car.url, error = %e, "Failed to send notification"),
            }
        }
        info!(sent, total = cars.len(), "Notifications sent");
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_delay_stays_in_window() {
        let pacing = Pacing::default();
        for _ in 0..100 {
            let delay = detail_delay(&pacing);
            assert!(delay >= Duration::from_millis(1500));
            assert!(delay < Duration::from_millis(3000));
        }
        assert_eq!(detail_delay(&Pacing::none()), Duration::ZERO);
    }
}
