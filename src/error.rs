use thiserror::Error;

/// Failures while talking to the listing site
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Failed to fetch {url}: {message}")]
    PageFetch { url: String, message: String },

    #[error("Blocked by anti-bot challenge at {url} ({marker})")]
    ExtractionBlocked { url: String, marker: String },

    #[error("Failed to extract {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Invalid selector {selector}")]
    Selector { selector: String },
}

/// Failures reading or writing the persisted JSON documents
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of the notification capability
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    NotConfigured(String),

    #[error("Invalid TELEGRAM_CHAT_ID: {0}")]
    InvalidChatId(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_error_names_url_and_marker() {
        let err = ScrapeError::ExtractionBlocked {
            url: "https://www.njuskalo.hr/auto/1".to_string(),
            marker: "ShieldSquare Captcha".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Blocked by anti-bot challenge at https://www.njuskalo.hr/auto/1 (ShieldSquare Captcha)"
        );
    }

    #[test]
    fn not_configured_error_is_descriptive() {
        let err = NotifyError::NotConfigured(
            "TELEGRAM_BOT_TOKEN environment variable not set".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: TELEGRAM_BOT_TOKEN environment variable not set"
        );
    }
}
