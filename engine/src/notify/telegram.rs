//! Telegram Bot API `sendMessage` notifier.

use super::Notifier;
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Clone, Deserialize)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base() -> String {
    TELEGRAM_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

// Keeps the bot token out of logs.
impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(settings: &TelegramSettings) -> EngineResult<Self> {
        if settings.bot_token.trim().is_empty() || settings.chat_id.trim().is_empty() {
            return Err(EngineError::ConfigError(
                "telegram notifier needs both bot_token and chat_id".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                settings.api_base.trim_end_matches('/'),
                settings.bot_token
            ),
            chat_id: settings.chat_id.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> EngineResult<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
        };
        // The endpoint embeds the bot token, so reqwest errors must not carry it.
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::from(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EngineError::NotificationError(format!(
                "sendMessage failed with {}: {}",
                status, detail
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(token: &str, chat_id: &str) -> TelegramSettings {
        TelegramSettings {
            bot_token: token.to_string(),
            chat_id: chat_id.to_string(),
            api_base: "http://localhost:8081/".to_string(),
            request_timeout_secs: 1,
        }
    }

    #[test]
    fn test_endpoint_built_from_token() {
        let notifier = TelegramNotifier::new(&settings("123:abc", "-100200")).unwrap();
        assert_eq!(notifier.endpoint, "http://localhost:8081/bot123:abc/sendMessage");
        assert_eq!(notifier.chat_id, "-100200");
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = TelegramNotifier::new(&settings("", "-100200")).err().unwrap();
        assert!(matches!(err, EngineError::ConfigError(_)));
        assert!(TelegramNotifier::new(&settings("123:abc", " ")).is_err());
    }

    #[test]
    fn test_payload_shape() {
        let body = SendMessage {
            chat_id: "42",
            text: "📊 buy @100",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "chat_id": "42", "text": "📊 buy @100" }));
    }

    #[test]
    fn test_debug_redacts_token() {
        let printed = format!("{:?}", settings("secret-token", "1"));
        assert!(!printed.contains("secret-token"));
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        let mut closed = settings("SECRET123:topsecret", "1");
        closed.api_base = "http://127.0.0.1:1".to_string();
        let notifier = TelegramNotifier::new(&closed).unwrap();

        let err = notifier.send("hi").await.unwrap_err();
        assert!(matches!(err, EngineError::HttpError { .. }));
        let printed = format!("{} {:?}", err, err);
        assert!(!printed.contains("topsecret"), "token leaked: {}", printed);
    }

    #[test]
    fn test_settings_defaults() {
        let parsed: TelegramSettings =
            serde_json::from_str(r#"{ "bot_token": "t", "chat_id": "c" }"#).unwrap();
        assert_eq!(parsed.api_base, TELEGRAM_API_BASE);
        assert_eq!(parsed.request_timeout_secs, 10);
    }
}
