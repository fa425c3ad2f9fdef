use crate::config::TelegramConfig;
use crate::error::NotifyError;
use crate::models::CarDetail;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fmt::Write;
use std::time::Duration;
use tracing::{debug, info};

pub const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    username: Option<String>,
}

/// Escape text for Telegram's HTML parse mode
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a car as an HTML Telegram message
pub fn format_car_message(car: &CarDetail) -> String {
    let mut msg = String::new();

    let _ = write!(msg, "<b>{}</b>\n\n", escape_html(&car.title));
    let _ = writeln!(msg, "<b>Cijena:</b> {}", escape_html(&car.price));
    let _ = write!(msg, "<b>Lokacija:</b> {}\n\n", escape_html(&car.location));

    msg.push_str("<b>Detalji:</b>\n");
    let details = [
        ("Godina", &car.year),
        ("Kilometraža", &car.mileage),
        ("Mjenjač", &car.gearbox),
        ("Snaga", &car.power),
        ("Motor", &car.engine),
        ("Tip", &car.car_type),
        ("Servisna knjiga", &car.service_book),
    ];
    for (label, value) in details {
        if !value.is_empty() {
            let _ = writeln!(msg, "• {}: {}", label, escape_html(value));
        }
    }

    let _ = write!(
        msg,
        "\n<a href=\"{}\">Pogledaj oglas</a>",
        escape_html(&car.url)
    );
    msg
}

/// Client for the Telegram Bot API
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            config,
            api_base: TELEGRAM_API.to_string(),
        })
    }

    /// Point the client at another API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.config.bot_token, method)
    }

    fn into_result<T>(response: ApiResponse<T>) -> Result<Option<T>, NotifyError> {
        if response.ok {
            Ok(response.result)
        } else {
            Err(NotifyError::Api(
                response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }

    /// Check the token and return the bot's username
    pub async fn authorize(&self) -> Result<String, NotifyError> {
        let response: ApiResponse<BotUser> = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .await?
            .json()
            .await?;

        let username = Self::into_result(response)?
            .and_then(|user| user.username)
            .unwrap_or_default();
        info!("Telegram bot authorized as @{}", username);
        Ok(username)
    }

    /// Send an HTML message to the configured chat
    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let payload = json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": false,
        });

        let response: ApiResponse<serde_json::Value> = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        Self::into_result(response)?;
        debug!(chat_id = self.config.chat_id, "Telegram message sent");
        Ok(())
    }
}
