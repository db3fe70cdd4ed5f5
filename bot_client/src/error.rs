use std::time::Duration;

use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BotClientError {
    /// Flood control: the service asks us to wait before retrying the same
    /// operation. Recoverable by sleeping for `retry_after`.
    #[error("rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("api error: {0}")]
    Api(String),

    #[error("malformed api response: {0}")]
    MalformedResponse(String),

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Reqwest Error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

// Define our own result type here (this seems to be the standard).
pub type Result<T> = std::result::Result<T, BotClientError>;

impl BotClientError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, BotClientError::RateLimited { .. })
    }
}
