use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the body's `error` field when present.
    #[error("mastodon API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid api_base_url: {0}")]
    BaseUrl(String),

    #[error("streaming error: {0}")]
    Stream(String),
}

pub type Result<T> = std::result::Result<T, Error>;
