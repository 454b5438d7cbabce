//! Watcher error taxonomy
//!
//! Recovery is the observer's job: `RateLimited` rotates credentials,
//! the first `AuthExpired` per fetch triggers a refresh and one retry,
//! `Transport` waits for the next tick, `ExhaustedRetries` is terminal
//! for the cycle. Startup treats any of these as fatal.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("access token expired or invalid")]
    AuthExpired,

    #[error(transparent)]
    Auth(#[from] spotify_auth::Error),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("retry attempts exhausted while every credential was rate limited")]
    ExhaustedRetries,
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

/// Result alias using the watcher Error
pub type Result<T> = std::result::Result<T, Error>;
