//! Error types for authentication operations

/// Errors from token acquisition.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("invalid client credentials: {0}")]
    InvalidCredentials(String),

    #[error("session token not found in web player response")]
    TokenNotFound,
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
