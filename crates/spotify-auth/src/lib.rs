//! Spotify authentication library
//!
//! Owns the two token lifecycles the watcher depends on, kept strictly
//! separate:
//!
//! 1. Per-credential bearer tokens from the client-credentials grant
//!    (`token::request_token`), used for the public profile endpoint.
//!    One bearer per registered application credential; stored on the
//!    pool slot that owns the credential.
//! 2. A single process-wide session token scraped from the authenticated
//!    web-player page (`session::fetch_session_token`), used for the
//!    private follower-list endpoint.
//!
//! This crate has no dependency on the watcher binary and can be tested
//! against mock HTTP servers on its own.

pub mod constants;
pub mod credentials;
pub mod error;
pub mod session;
pub mod token;

pub use constants::*;
pub use credentials::ClientCredential;
pub use error::{Error, Result};
pub use session::{extract_session_token, fetch_session_token};
pub use token::{TokenResponse, request_token};
