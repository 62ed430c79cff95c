use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    /// Transport failure. The request URL is stripped because it embeds the bot token.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Bot API answered with `ok: false`
    #[error("Telegram API error ({code:?}): {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },

    #[error("unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },
}

impl From<reqwest::Error> for TelegramError {
    fn from(error: reqwest::Error) -> Self {
        TelegramError::Http(error.without_url())
    }
}

pub type Result<T> = std::result::Result<T, TelegramError>;
