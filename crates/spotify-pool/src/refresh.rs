//! Bearer token refresh across the whole pool
//!
//! Walks every slot in pool order and performs the client-credentials
//! grant for it. The first failure is logged and re-raised: at startup
//! the caller treats that as fatal, mid-run the caller decides whether
//! to retry on the next cycle.

use spotify_auth::{Result, request_token};
use tracing::{info, warn};

use crate::pool::Pool;

/// Exchange a fresh bearer token for every credential in the pool.
pub async fn refresh_all(pool: &Pool, client: &reqwest::Client, token_url: &str) -> Result<()> {
    for index in 0..pool.len().await {
        let Some(credential) = pool.credential(index).await else {
            continue;
        };
        match request_token(client, token_url, &credential).await {
            Ok(token) => {
                info!(
                    account_id = %credential.masked_id(),
                    expires_in = token.expires_in,
                    "access token refreshed"
                );
                pool.set_bearer(index, token.access_token).await;
            }
            Err(e) => {
                warn!(
                    account_id = %credential.masked_id(),
                    error = %e,
                    "access token refresh failed"
                );
                return Err(e);
            }
        }
    }
    Ok(())
}
