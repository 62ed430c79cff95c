//! Pure Telegram Bot API client.
//!
//! Covers the handful of methods a notification bot needs: `getMe`,
//! `sendMessage` and `sendPhoto`.
//!
//! # Example
//!
//! ```rust,ignore
//! use telegram::{ParseMode, TelegramOptions, TelegramService};
//!
//! let bot = TelegramService::new(TelegramOptions::new("123:ABC"));
//! bot.send_message("5040524806", "*hello*", Some(ParseMode::Markdown)).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{Result, TelegramError};
pub use types::{Message, ParseMode, User};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use types::{ApiResponse, SendMessageRequest, SendPhotoRequest};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub token: String,
    pub api_base: String,
    /// Upper bound for one API call, connect to last byte
    pub timeout: Duration,
}

impl TelegramOptions {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the client at a different Bot API server (self-hosted or test double).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TelegramService {
    options: TelegramOptions,
    client: Client,
}

impl TelegramService {
    pub fn new(options: TelegramOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.options.api_base.trim_end_matches('/'),
            self.options.token,
            method
        )
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .client
            .post(self.method_url(method))
            .timeout(self.options.timeout)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(method, status = status.as_u16(), "Telegram API call finished");

        decode_response(status.as_u16(), &text)
    }

    /// Return the bot's own account. Useful as a credentials check.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
        };
        self.call("sendMessage", &body).await
    }

    /// Send a photo by URL. Telegram fetches the image itself, so an unreachable
    /// or unsupported image surfaces here as [`TelegramError::Api`].
    pub async fn send_photo(
        &self,
        chat_id: &str,
        photo_url: &str,
        caption: Option<&str>,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message> {
        let body = SendPhotoRequest {
            chat_id,
            photo: photo_url,
            caption,
            parse_mode,
        };
        self.call("sendPhoto", &body).await
    }
}

fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    let envelope: ApiResponse<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            return Err(TelegramError::UnexpectedResponse {
                status,
                body: body.to_string(),
            })
        }
    };

    if !envelope.ok {
        return Err(TelegramError::Api {
            code: envelope.error_code,
            description: envelope
                .description
                .unwrap_or_else(|| "no description".to_string()),
        });
    }

    envelope.result.ok_or(TelegramError::UnexpectedResponse {
        status,
        body: body.to_string(),
    })
}
