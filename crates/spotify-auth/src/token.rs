//! Client-credentials token exchange
//!
//! POSTs `grant_type=client_credentials` to the accounts token endpoint
//! with HTTP basic auth. Each credential in the pool gets its own bearer
//! token this way; refresh of the whole pool lives in `spotify-pool`.

use serde::Deserialize;

use crate::credentials::ClientCredential;
use crate::error::{Error, Result};

/// Response from the client-credentials grant.
///
/// `expires_in` is a delta in seconds. The watcher does not schedule
/// proactive refresh from it — expiry is detected reactively via 401 —
/// but it is kept for logging.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Seconds until the token expires (delta, not absolute)
    pub expires_in: u64,
}

/// Request a bearer token for one credential.
///
/// `token_url` is a parameter (production value `constants::TOKEN_URL`)
/// so tests can point at a mock server.
pub async fn request_token(
    client: &reqwest::Client,
    token_url: &str,
    credential: &ClientCredential,
) -> Result<TokenResponse> {
    let response = client
        .post(token_url)
        .basic_auth(&credential.id, Some(credential.secret.expose()))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        // 400/401 from the accounts endpoint means the id/secret pair is bad
        if status.as_u16() == 400 || status.as_u16() == 401 {
            return Err(Error::InvalidCredentials(format!(
                "client {} rejected ({status}): {body}",
                credential.masked_id()
            )));
        }

        return Err(Error::TokenExchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credential() -> ClientCredential {
        ClientCredential::new("0123456789abcdef", "shh")
    }

    #[tokio::test]
    async fn request_token_sends_grant_and_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "BQtoken",
                "token_type": "Bearer",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/api/token", server.uri());
        let token = request_token(&client, &url, &credential()).await.unwrap();
        assert_eq!(token.access_token, "BQtoken");
        assert_eq!(token.expires_in, 3600);
    }

    #[tokio::test]
    async fn bad_credentials_map_to_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":"invalid_client"}"#),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/api/token", server.uri());
        let err = request_token(&client, &url, &credential())
            .await
            .unwrap_err();
        match err {
            Error::InvalidCredentials(msg) => {
                assert!(msg.contains("****cdef"), "masked id in message: {msg}");
                assert!(!msg.contains("0123456789"), "full id must not leak: {msg}");
            }
            other => panic!("expected InvalidCredentials, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_maps_to_token_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/api/token", server.uri());
        let err = request_token(&client, &url, &credential())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TokenExchange(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_token_exchange_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/api/token", server.uri());
        let err = request_token(&client, &url, &credential())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TokenExchange(_)), "got {err:?}");
    }
}
