//! Configuration loading
//!
//! Everything comes from environment variables. Credentials are numbered
//! from 1 (SPOTIFY_CLIENT_ID1/SPOTIFY_CLIENT_SECRET1, ID2/SECRET2, ...)
//! and collection stops at the first missing pair, so the pool size is
//! whatever the environment provides. Secrets are wrapped on load and
//! never appear in Debug output.

use std::path::PathBuf;
use std::time::Duration;

use common::Secret;
use spotify_auth::ClientCredential;

const DEFAULT_POLL_INTERVAL_MS: u64 = 600;
const DEFAULT_FOLLOWERS_LOG: &str = "followers_log.json";
const DEFAULT_ERROR_LOG: &str = "error_log.txt";

/// Root configuration
#[derive(Debug)]
pub struct Config {
    pub credentials: Vec<ClientCredential>,
    pub target_user_id: String,
    pub cookie: Secret<String>,
    pub client_token: Secret<String>,
    pub twilio: TwilioConfig,
    pub poll_interval: Duration,
    pub followers_log: PathBuf,
    pub error_log: PathBuf,
}

/// SMS delivery settings
#[derive(Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: Secret<String>,
    pub from: String,
    pub to: String,
}

fn required(name: &str) -> common::Result<String> {
    std::env::var(name)
        .map_err(|_| common::Error::Config(format!("{name} must be set")))
}

impl Config {
    /// Load and validate configuration from the environment.
    pub fn from_env() -> common::Result<Self> {
        let mut credentials = Vec::new();
        for n in 1.. {
            let (id, secret) = match (
                std::env::var(format!("SPOTIFY_CLIENT_ID{n}")),
                std::env::var(format!("SPOTIFY_CLIENT_SECRET{n}")),
            ) {
                (Ok(id), Ok(secret)) => (id, secret),
                _ => break,
            };
            credentials.push(ClientCredential::new(id, secret));
        }
        if credentials.is_empty() {
            return Err(common::Error::Config(
                "at least one SPOTIFY_CLIENT_ID1/SPOTIFY_CLIENT_SECRET1 pair must be set".into(),
            ));
        }

        let poll_interval_ms = match std::env::var("POLL_INTERVAL_MS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                common::Error::Config(format!("POLL_INTERVAL_MS must be an integer, got: {raw}"))
            })?,
            Err(_) => DEFAULT_POLL_INTERVAL_MS,
        };
        if poll_interval_ms == 0 {
            return Err(common::Error::Config(
                "POLL_INTERVAL_MS must be greater than 0".into(),
            ));
        }

        let followers_log = std::env::var("FOLLOWERS_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_FOLLOWERS_LOG));
        let error_log = std::env::var("ERROR_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ERROR_LOG));

        Ok(Self {
            credentials,
            target_user_id: required("TARGET_USER_ID")?,
            cookie: Secret::new(required("SPOTIFY_COOKIE")?),
            client_token: Secret::new(required("SPOTIFY_CLIENT_TOKEN")?),
            twilio: TwilioConfig {
                account_sid: required("TWILIO_ACCOUNT_SID")?,
                auth_token: Secret::new(required("TWILIO_AUTH_TOKEN")?),
                from: required("TWILIO_FROM")?,
                to: required("TWILIO_TO")?,
            },
            poll_interval: Duration::from_millis(poll_interval_ms),
            followers_log,
            error_log,
        })
    }
}
