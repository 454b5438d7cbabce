//! Twilio SMS notifier
//!
//! Plain REST call: form-encoded POST to the Messages resource with
//! account-SID basic auth. The message body carries the follower's name
//! and profile identifier; sender and recipient are fixed at startup.

use std::future::Future;
use std::pin::Pin;

use common::{FollowerRecord, Secret};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Error, Notifier, Result};

/// Production Twilio API base.
pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// SMS notifier backed by Twilio's Messages API.
pub struct TwilioNotifier {
    client: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: Secret<String>,
    from: String,
    to: String,
}

/// Subset of the Messages resource response we care about.
#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: Option<String>,
}

impl TwilioNotifier {
    /// `base_url` is a parameter (production value `TWILIO_API_BASE`) so
    /// tests can point at a mock server.
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        account_sid: String,
        auth_token: Secret<String>,
        from: String,
        to: String,
    ) -> Self {
        Self {
            client,
            base_url,
            account_sid,
            auth_token,
            from,
            to,
        }
    }

    async fn send(&self, follower: &FollowerRecord) -> Result<()> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let body = format!(
            "New Follower Alert! 🎉\n\nName: {}\nProfile: {}",
            follower.name, follower.uri
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose()))
            .form(&[
                ("To", self.to.as_str()),
                ("From", self.from.as_str()),
                ("Body", body.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format!("sending message: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        match response.json::<MessageResponse>().await {
            Ok(message) => debug!(
                sid = message.sid.as_deref().unwrap_or("<none>"),
                name = %follower.name,
                "sms notification sent"
            ),
            Err(e) => warn!(error = %e, "unreadable message response, send assumed ok"),
        }
        Ok(())
    }
}

impl Notifier for TwilioNotifier {
    fn notify<'a>(
        &'a self,
        follower: &'a FollowerRecord,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.send(follower))
    }
}
