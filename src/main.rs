use anyhow::Context;
use car_scout::scrapers::ChromeDriver;
use car_scout::store::ProcessedUrlStore;
use car_scout::{Notifier, Pipeline, Settings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚗 Car Scout - Njuškalo VW scraper");
    info!("==================================");

    let settings = Settings::default();

    let notifier = Notifier::from_env();
    if notifier.is_configured() {
        if let Err(e) = notifier.authorize().await {
            warn!(error = %e, "Telegram authorization failed");
        }
    }

    // A corrupt processed set must never be overwritten, so stop before the browser starts
    let store = ProcessedUrlStore::load(&settings.processed_file)
        .await
        .context("could not load processed URLs")?;

    // Nothing works without a browser
    let driver = ChromeDriver::launch().context("could not start page driver")?;

    let pipeline = Pipeline::new(&driver, settings, notifier);
    let summary = pipeline.run(store).await;

    if summary.matches.is_empty() {
        println!("\nNo cars matched your filters in this session.");
    } else {
        println!("\nFiltered Results:");
        println!("{}", serde_json::to_string_pretty(&summary.matches)?);
    }

    let elapsed = summary.finished_at - summary.started_at;
    info!(
        found = summary.ads_found,
        new = summary.new_ads,
        extracted = summary.extracted,
        failed = summary.failed,
        rejected = summary.rejections.total(),
        matched = summary.matches.len(),
        notified = summary.notified,
        seconds = elapsed.num_seconds(),
        "✅ Scraping session complete!"
    );

    Ok(())
}
