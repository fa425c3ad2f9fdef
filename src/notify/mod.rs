pub mod telegram;

pub use telegram::{format_car_message, TelegramNotifier};

use crate::config::TelegramConfig;
use crate::error::NotifyError;
use crate::models::CarDetail;
use tracing::warn;

/// Notification capability, either ready to send or explicitly unavailable
pub enum Notifier {
    Telegram(TelegramNotifier),
    NotConfigured(String),
}

impl Notifier {
    /// Build from `TELEGRAM_BOT_TOKEN`/`TELEGRAM_CHAT_ID`. Missing settings are not fatal.
    pub fn from_env() -> Self {
        match TelegramConfig::from_env().and_then(TelegramNotifier::new) {
            Ok(notifier) => Notifier::Telegram(notifier),
            Err(e) => {
                warn!(error = %e, "Telegram notifications disabled");
                Notifier::NotConfigured(e.to_string())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Notifier::Telegram(_))
    }

    fn client(&self) -> Result<&TelegramNotifier, NotifyError> {
        match self {
            Notifier::Telegram(client) => Ok(client),
            Notifier::NotConfigured(reason) => Err(NotifyError::NotConfigured(reason.clone())),
        }
    }

    pub async fn authorize(&self) -> Result<String, NotifyError> {
        self.client()?.authorize().await
    }

    pub async fn send_car(&self, car: &CarDetail) -> Result<(), NotifyError> {
        self.client()?.send_message(&format_car_message(car)).await
    }
}
