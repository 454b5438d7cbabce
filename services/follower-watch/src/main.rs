//! Spotify follower watcher
//!
//! Single-binary service that:
//! 1. Exchanges every configured client credential for an access token
//! 2. Scrapes a web-player session token for the private follower list
//! 3. Polls the follower count on a fixed interval, rotating credentials
//! 4. On a change, diffs the follower list and sends one SMS per new
//!    follower, appending the change to an on-disk record

mod changelog;
mod client;
mod config;
mod diff;
mod error;
mod observer;

use std::sync::Arc;

use anyhow::{Context, Result};
use notifier::{TWILIO_API_BASE, TwilioNotifier};
use spotify_pool::Pool;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::changelog::ChangeLog;
use crate::client::SpotifyClient;
use crate::config::Config;
use crate::observer::Observer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting follower-watch");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        credentials = config.credentials.len(),
        target_user = %config.target_user_id,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "configuration loaded"
    );

    let http = reqwest::Client::new();
    let pool = Arc::new(Pool::new(config.credentials));
    let client = SpotifyClient::new(
        http.clone(),
        spotify_auth::API_BASE.to_string(),
        spotify_auth::PRIVATE_API_BASE.to_string(),
        config.target_user_id,
        config.client_token,
    );
    let notifier = Arc::new(TwilioNotifier::new(
        http.clone(),
        TWILIO_API_BASE.to_string(),
        config.twilio.account_sid,
        config.twilio.auth_token,
        config.twilio.from,
        config.twilio.to,
    ));
    let changelog = ChangeLog::new(config.followers_log, config.error_log);

    // Keep a handle for recording startup failures; bootstrap owns the rest
    let startup_log = changelog.clone();
    let mut observer = match Observer::bootstrap(
        pool,
        client,
        http,
        spotify_auth::TOKEN_URL.to_string(),
        spotify_auth::WEB_PLAYER_BASE.to_string(),
        config.cookie,
        notifier,
        changelog,
    )
    .await
    {
        Ok(observer) => observer,
        Err(e) => {
            error!(error = %e, "startup failed");
            if let Err(log_err) = startup_log.record_error(&e.to_string()).await {
                error!(error = %log_err, "failed to append startup error record");
            }
            return Err(e).context("startup failed");
        }
    };

    info!("watching for follower changes");
    tokio::select! {
        _ = observer.run(config.poll_interval) => {}
        _ = shutdown_signal() => {}
    }

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
