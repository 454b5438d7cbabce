//! Spotify endpoint and header constants
//!
//! These values are not secrets — they identify public endpoints and the
//! web-player client surface the private follower endpoint expects. The
//! actual secrets (client secrets, cookie, client-token) come from the
//! environment and are wrapped in `common::Secret`.

/// Token endpoint for the client-credentials grant
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Public Web API base (follower count endpoint lives here)
pub const API_BASE: &str = "https://api.spotify.com";

/// Web player origin; the session token is scraped from a page load here
pub const WEB_PLAYER_BASE: &str = "https://open.spotify.com";

/// Page path fetched for the session token scrape
pub const WEB_PLAYER_PAGE: &str = "/intl-tr";

/// Private API base (follower list endpoint lives here)
pub const PRIVATE_API_BASE: &str = "https://spclient.wg.spotify.com";

/// `spotify-app-version` header the private endpoint expects.
/// External, versioned contract: when the web player moves on, the
/// private endpoint may start rejecting this value.
pub const APP_VERSION: &str = "1.2.55.140.g17be258d";

/// Browser user agent sent on the page scrape and private API calls
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Accept header for the web player page load
pub const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// Accept-Language for the web player page load
pub const PAGE_ACCEPT_LANGUAGE: &str = "tr,en;q=0.9,en-US;q=0.8,tr-TR;q=0.7";
