use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("AI provider error: {0}")]
    Provider(anyhow::Error),

    #[error("Extractor error: {0}")]
    Extractor(#[from] taglens_core::Error),

    #[error("Unauthorized access from chat_id: {0}")]
    Unauthorized(i64),
}
