use crate::error::NotifyError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const BASE_URL: &str = "https://www.njuskalo.hr";

pub const SEARCH_URL: &str = "https://www.njuskalo.hr/search/?keywords=vw+tiguan&showAllCategories=1&price[min]=10000&price[max]=15000&condition[used]=1&adsWithImages=1";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Safety cap on followed search pages
pub const MAX_SEARCH_PAGES: usize = 50;

pub const ACCEPT_LANGUAGE: &str = "hr-HR,hr;q=0.9,en-US;q=0.8,en;q=0.7";

/// Delays between page loads
#[derive(Debug, Clone)]
pub struct Pacing {
    /// Fixed delay between search result pages
    pub search_page_delay: Duration,
    /// Lower bound of the delay between detail pages
    pub detail_delay_min: Duration,
    /// Width of the random window added on top of `detail_delay_min`
    pub detail_delay_jitter: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            search_page_delay: Duration::from_secs(2),
            detail_delay_min: Duration::from_millis(1500),
            detail_delay_jitter: Duration::from_millis(1500),
        }
    }
}

impl Pacing {
    /// No waiting at all, used by tests
    pub fn none() -> Self {
        Self {
            search_page_delay: Duration::ZERO,
            detail_delay_min: Duration::ZERO,
            detail_delay_jitter: Duration::ZERO,
        }
    }
}

/// Run settings. Everything is fixed; there are no command-line flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub search_url: String,
    pub base_url: String,
    pub processed_file: PathBuf,
    pub results_file: PathBuf,
    pub debug_dir: PathBuf,
    pub pacing: Pacing,
    /// Safety cap on followed search pages
    pub max_pages: usize,
    /// Save the processed set after this many newly processed ads
    pub checkpoint_every: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_url: SEARCH_URL.to_string(),
            base_url: BASE_URL.to_string(),
            processed_file: PathBuf::from("processed_urls.json"),
            results_file: PathBuf::from("results.json"),
            debug_dir: PathBuf::from("debug"),
            pacing: Pacing::default(),
            max_pages: MAX_SEARCH_PAGES,
            checkpoint_every: 5,
        }
    }
}

/// Credentials for the Telegram Bot API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

impl TelegramConfig {
    /// Read `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` from the environment
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_vars(
            env::var("TELEGRAM_BOT_TOKEN").ok(),
            env::var("TELEGRAM_CHAT_ID").ok(),
        )
    }

    pub fn from_vars(token: Option<String>, chat_id: Option<String>) -> Result<Self, NotifyError> {
        let bot_token = token.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
            NotifyError::NotConfigured("TELEGRAM_BOT_TOKEN environment variable not set".to_string())
        })?;

        let chat_id_raw = chat_id.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            NotifyError::NotConfigured("TELEGRAM_CHAT_ID environment variable not set".to_string())
        })?;

        let chat_id = chat_id_raw
            .trim()
            .parse::<i64>()
            .map_err(|e| NotifyError::InvalidChatId(format!("{chat_id_raw}: {e}")))?;

        Ok(Self { bot_token, chat_id })
    }
}
