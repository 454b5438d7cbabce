//! Poll-cycle observer
//!
//! One task drives one cycle at a time: fetch the follower count, and on
//! a change fetch the full list, diff it against the held snapshot,
//! notify per added follower, append a change record, and swap the
//! snapshot. Because the loop owns the observer mutably and awaits each
//! cycle to completion, cycles can never overlap.
//!
//! Count-fetch recovery:
//! - 429 puts the used credential in cooldown and immediately retries
//!   with the next selection (the credential is delayed, not the caller)
//! - the first 401 triggers one `refresh_all` and one retry
//! - the retry loop is bounded; exhausting it is a terminal cycle error
//!
//! List-fetch recovery: one session-token refresh and one retry on 401.
//! Any cycle error is appended to the error record and the next tick
//! retries naturally.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{FollowerRecord, Secret};
use notifier::Notifier;
use spotify_pool::{Pool, refresh_all};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::changelog::{ChangeEvent, ChangeLog};
use crate::client::SpotifyClient;
use crate::diff::diff;
use crate::error::{Error, Result};

/// Upper bound on count-fetch attempts within one cycle. Rotation across
/// rate-limited credentials converges on its own; the bound only guards
/// against every credential staying delayed indefinitely.
const MAX_COUNT_ATTEMPTS: usize = 10;

/// Owns the full poll-cycle state: credential pool, session token,
/// previous count, and the current follower snapshot.
pub struct Observer {
    pool: Arc<Pool>,
    client: SpotifyClient,
    http: reqwest::Client,
    token_url: String,
    web_base: String,
    cookie: Secret<String>,
    session_token: String,
    notifier: Arc<dyn Notifier>,
    changelog: ChangeLog,
    previous_count: Option<u64>,
    snapshot: Vec<FollowerRecord>,
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer").finish_non_exhaustive()
    }
}

impl Observer {
    /// Acquire all tokens and the initial follower snapshot.
    ///
    /// Any failure here is a startup failure: the caller logs it and
    /// exits non-zero.
    #[allow(clippy::too_many_arguments)]
    pub async fn bootstrap(
        pool: Arc<Pool>,
        client: SpotifyClient,
        http: reqwest::Client,
        token_url: String,
        web_base: String,
        cookie: Secret<String>,
        notifier: Arc<dyn Notifier>,
        changelog: ChangeLog,
    ) -> Result<Self> {
        refresh_all(&pool, &http, &token_url).await?;
        let session_token = spotify_auth::fetch_session_token(&http, &web_base, &cookie).await?;
        let snapshot = client.follower_list(&session_token).await?;
        info!(followers = snapshot.len(), "initial follower snapshot loaded");

        Ok(Self {
            pool,
            client,
            http,
            token_url,
            web_base,
            cookie,
            session_token,
            notifier,
            changelog,
            previous_count: None,
            snapshot,
        })
    }

    /// Drive poll cycles forever at the given interval.
    pub async fn run(&mut self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.poll_once().await {
                warn!(error = %e, "poll cycle failed");
                if let Err(log_err) = self.changelog.record_error(&e.to_string()).await {
                    warn!(error = %log_err, "failed to append error record");
                }
            }
        }
    }

    /// Run one poll cycle.
    ///
    /// The new count is stored only after the cycle succeeds, so a
    /// failed change-handling cycle re-detects the same change on the
    /// next tick instead of losing it.
    pub async fn poll_once(&mut self) -> Result<()> {
        let count = self.fetch_count().await?;
        match self.previous_count {
            None => {
                debug!(followers = count, "first observation, nothing to diff");
            }
            Some(previous) if previous == count => {}
            Some(previous) => {
                info!(previous, current = count, "follower count changed");
                self.handle_change(count).await?;
            }
        }
        self.previous_count = Some(count);
        Ok(())
    }

    /// Fetch the follower count with credential rotation.
    async fn fetch_count(&self) -> Result<u64> {
        let mut refreshed = false;
        for _ in 0..MAX_COUNT_ATTEMPTS {
            let selected = self.pool.select().await;
            let bearer = match &selected.bearer {
                Some(token) => token.clone(),
                // No token on this slot yet: same recovery as expiry
                None if !refreshed => {
                    refresh_all(&self.pool, &self.http, &self.token_url).await?;
                    refreshed = true;
                    continue;
                }
                None => return Err(Error::AuthExpired),
            };

            match self.client.follower_count(&bearer).await {
                Ok(count) => {
                    debug!(
                        account_id = %selected.masked_id,
                        followers = count,
                        "follower count fetched"
                    );
                    return Ok(count);
                }
                Err(Error::RateLimited { retry_after_secs }) => {
                    self.pool
                        .record_rate_limited(selected.index, retry_after_secs)
                        .await;
                    // Retry immediately with the next selection
                }
                Err(Error::AuthExpired) if !refreshed => {
                    info!("access token expired, refreshing all credentials");
                    refresh_all(&self.pool, &self.http, &self.token_url).await?;
                    refreshed = true;
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::ExhaustedRetries)
    }

    /// Handle a detected count change: list, diff, notify, record, swap.
    async fn handle_change(&mut self, count: u64) -> Result<()> {
        let new_list = self.fetch_list().await?;
        let changes = diff(&new_list, &self.snapshot);

        for follower in &changes.added {
            info!(name = %follower.name, uri = %follower.uri, "new follower");
            if let Err(e) = self.notifier.notify(follower).await {
                warn!(name = %follower.name, error = %e, "notification failed");
            }
        }
        if !changes.removed.is_empty() {
            info!(count = changes.removed.len(), "followers removed");
        }

        let event = ChangeEvent {
            timestamp: Utc::now(),
            followers: count,
            added: changes.added,
            removed: changes.removed,
        };
        if let Err(e) = self.changelog.record_change(&event).await {
            warn!(error = %e, "failed to append change record");
        }

        self.snapshot = new_list;
        Ok(())
    }

    /// Fetch the follower list, refreshing the session token at most
    /// once on 401.
    async fn fetch_list(&mut self) -> Result<Vec<FollowerRecord>> {
        match self.client.follower_list(&self.session_token).await {
            Ok(list) => Ok(list),
            Err(Error::AuthExpired) => {
                info!("session token expired, refreshing from web player");
                self.session_token =
                    spotify_auth::fetch_session_token(&self.http, &self.web_base, &self.cookie)
                        .await?;
                self.client.follower_list(&self.session_token).await
            }
            Err(e) => Err(e),
        }
    }
}
