//! Session token scrape
//!
//! The private follower-list endpoint is authenticated with a token the
//! web player embeds in its page markup. We load the page with the
//! long-lived session cookie and extract the token by pattern match.
//!
//! The embedded format (`"accessToken":"<token>"`) is an external
//! contract that can break without notice; a pattern miss fails loudly
//! with `TokenNotFound` rather than returning anything stale.

use std::sync::LazyLock;

use common::Secret;
use regex::Regex;
use tracing::{debug, info};

use crate::constants::{PAGE_ACCEPT, PAGE_ACCEPT_LANGUAGE, USER_AGENT, WEB_PLAYER_PAGE};
use crate::error::{Error, Result};

static ACCESS_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""accessToken":"([^"]+)""#).expect("valid access token pattern"));

/// Extract the embedded session token from web player page markup.
pub fn extract_session_token(html: &str) -> Result<String> {
    ACCESS_TOKEN_PATTERN
        .captures(html)
        .map(|captures| captures[1].to_string())
        .ok_or(Error::TokenNotFound)
}

/// Fetch a fresh session token by loading the web player page.
///
/// `web_base` is a parameter (production value `constants::WEB_PLAYER_BASE`)
/// so tests can point at a mock server. Exactly one session token is held
/// process-wide; the caller overwrites its copy on every success here.
pub async fn fetch_session_token(
    client: &reqwest::Client,
    web_base: &str,
    cookie: &Secret<String>,
) -> Result<String> {
    let url = format!("{web_base}{WEB_PLAYER_PAGE}");
    debug!(url = %url, "fetching web player page for session token");

    let response = client
        .get(&url)
        .header(reqwest::header::ACCEPT, PAGE_ACCEPT)
        .header(reqwest::header::ACCEPT_LANGUAGE, PAGE_ACCEPT_LANGUAGE)
        .header(reqwest::header::CACHE_CONTROL, "max-age=0")
        .header(reqwest::header::COOKIE, cookie.expose().as_str())
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .map_err(|e| Error::Http(format!("web player page request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http(format!("web player page returned {status}")));
    }

    let html = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading web player page: {e}")))?;

    let token = extract_session_token(&html)?;
    info!("session token refreshed from web player");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE_WITH_TOKEN: &str = r#"<html><script id="session" data-testid="session"
type="application/json">{"accessToken":"BQg-session-token-123","accessTokenExpirationTimestampMs":1735000000000}</script></html>"#;

    #[test]
    fn extracts_token_from_page_markup() {
        let token = extract_session_token(PAGE_WITH_TOKEN).unwrap();
        assert_eq!(token, "BQg-session-token-123");
    }

    #[test]
    fn missing_pattern_is_token_not_found() {
        let err = extract_session_token("<html>logged out</html>").unwrap_err();
        assert!(matches!(err, Error::TokenNotFound));
    }

    #[test]
    fn empty_token_value_is_not_matched() {
        let err = extract_session_token(r#"{"accessToken":""}"#).unwrap_err();
        assert!(matches!(err, Error::TokenNotFound));
    }

    #[tokio::test]
    async fn fetch_sends_cookie_and_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WEB_PLAYER_PAGE))
            .and(header("cookie", "sp_dc=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE_WITH_TOKEN))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let cookie = Secret::new(String::from("sp_dc=abc123"));
        let token = fetch_session_token(&client, &server.uri(), &cookie)
            .await
            .unwrap();
        assert_eq!(token, "BQg-session-token-123");
    }

    #[tokio::test]
    async fn logged_out_page_fails_loudly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let cookie = Secret::new(String::from("sp_dc=expired"));
        let err = fetch_session_token(&client, &server.uri(), &cookie)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TokenNotFound));
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let cookie = Secret::new(String::from("sp_dc=blocked"));
        let err = fetch_session_token(&client, &server.uri(), &cookie)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)), "got {err:?}");
    }
}
