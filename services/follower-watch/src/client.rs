//! Spotify API surface
//!
//! Two read endpoints with different auth:
//! - follower count from the public Web API, per-credential bearer
//! - follower list from the private profile-view API, session bearer
//!   plus the static client-token header
//!
//! Status handling maps straight onto the watcher taxonomy: 429 becomes
//! `RateLimited` with the parsed `retry-after`, 401 becomes
//! `AuthExpired`, anything else non-2xx is `Transport`.

use common::{FollowerRecord, Secret};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Fallback when a 429 carries no usable `retry-after` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// HTTP client for the two Spotify read endpoints.
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: String,
    private_base: String,
    user_id: String,
    client_token: Secret<String>,
}

#[derive(Debug, Deserialize)]
struct UserProfile {
    followers: FollowerTotals,
}

#[derive(Debug, Deserialize)]
struct FollowerTotals {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct FollowersPage {
    profiles: Vec<FollowerRecord>,
}

impl SpotifyClient {
    /// Base URLs are parameters (production values `spotify_auth::API_BASE`
    /// and `spotify_auth::PRIVATE_API_BASE`) so tests can point at mock
    /// servers.
    pub fn new(
        http: reqwest::Client,
        api_base: String,
        private_base: String,
        user_id: String,
        client_token: Secret<String>,
    ) -> Self {
        Self {
            http,
            api_base,
            private_base,
            user_id,
            client_token,
        }
    }

    /// Current follower total from the public profile endpoint.
    pub async fn follower_count(&self, bearer: &str) -> Result<u64> {
        let url = format!("{}/v1/users/{}", self.api_base, self.user_id);
        let response = self.http.get(&url).bearer_auth(bearer).send().await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {
                let profile: UserProfile = response.json().await?;
                Ok(profile.followers.total)
            }
            429 => Err(Error::RateLimited {
                retry_after_secs: retry_after_secs(response.headers()),
            }),
            401 => Err(Error::AuthExpired),
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| String::from("<no body>"));
                Err(Error::Transport(format!(
                    "count endpoint returned {status}: {body}"
                )))
            }
        }
    }

    /// Full follower list from the private profile-view endpoint.
    pub async fn follower_list(&self, session_token: &str) -> Result<Vec<FollowerRecord>> {
        let url = format!(
            "{}/user-profile-view/v3/profile/{}/followers?market=from_token",
            self.private_base, self.user_id
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(session_token)
            .header("client-token", self.client_token.expose().as_str())
            .header("app-platform", "WebPlayer")
            .header("spotify-app-version", spotify_auth::APP_VERSION)
            .header(reqwest::header::ORIGIN, spotify_auth::WEB_PLAYER_BASE)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, "tr")
            .header(reqwest::header::USER_AGENT, spotify_auth::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {
                let page: FollowersPage = response.json().await?;
                debug!(followers = page.profiles.len(), "follower list fetched");
                Ok(page.profiles)
            }
            401 => Err(Error::AuthExpired),
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| String::from("<no body>"));
                Err(Error::Transport(format!(
                    "followers endpoint returned {status}: {body}"
                )))
            }
        }
    }
}

/// Parse the `retry-after` seconds header, defaulting when absent or
/// unparseable.
fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
