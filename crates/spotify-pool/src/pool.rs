//! Pool state and rate-limit-aware credential selection
//!
//! Selection never fails: if every credential is cooling down, the one
//! with the least remaining cooldown is returned anyway. The caller is
//! expected to hit another 429, refresh that slot's cooldown, and
//! converge once the shortest window expires.

use std::time::{Duration, Instant};

use spotify_auth::ClientCredential;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Safety margin added on top of the server-provided retry-after delay.
const COOLDOWN_MARGIN: Duration = Duration::from_secs(2);

/// Ceiling on the server-provided retry-after delay. The header comes
/// straight off the wire; an absurd value must not overflow the
/// `Instant` arithmetic or park a credential forever.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60 * 60);

struct Slot {
    credential: ClientCredential,
    bearer: Option<String>,
    cooldown_until: Option<Instant>,
}

struct PoolState {
    slots: Vec<Slot>,
    /// Index of the most recently selected slot; selection continues
    /// round-robin after it.
    last_used: Option<usize>,
}

/// A selected credential, ready for one request.
#[derive(Debug, Clone)]
pub struct SelectedCredential {
    /// Slot index, used to report a rate limit back to the pool.
    pub index: usize,
    /// Masked client id for logging.
    pub masked_id: String,
    /// Current bearer token; `None` until the first `refresh_all`.
    pub bearer: Option<String>,
}

/// Credential pool with per-slot cooldown bookkeeping.
///
/// A single mutex guards the whole state. The poll cycle is sequential,
/// so contention only occurs if a refresh runs concurrently with a
/// selection, which the lock serializes.
pub struct Pool {
    state: Mutex<PoolState>,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool").finish_non_exhaustive()
    }
}

impl Pool {
    /// Build a pool from the configured credentials, all immediately
    /// selectable (bearer tokens arrive with the first `refresh_all`).
    ///
    /// The pool must hold at least one credential; `select` has nothing
    /// to return otherwise. Config validation enforces this upstream.
    pub fn new(credentials: Vec<ClientCredential>) -> Self {
        debug_assert!(!credentials.is_empty(), "pool requires at least one credential");
        info!(credentials = credentials.len(), "credential pool initialized");
        let slots = credentials
            .into_iter()
            .map(|credential| Slot {
                credential,
                bearer: None,
                cooldown_until: None,
            })
            .collect();
        Self {
            state: Mutex::new(PoolState {
                slots,
                last_used: None,
            }),
        }
    }

    /// Select the next credential. Never fails.
    ///
    /// Expired cooldowns are cleared as a side effect of the check. Among
    /// available slots the first one after the last-used index wins,
    /// wrapping to the first available; with none available, the slot
    /// with the smallest remaining cooldown wins (ties by pool order).
    /// The last-used index advances to the selection either way.
    pub async fn select(&self) -> SelectedCredential {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        for (index, slot) in state.slots.iter_mut().enumerate() {
            if let Some(until) = slot.cooldown_until {
                if until <= now {
                    debug!(
                        account_id = %slot.credential.masked_id(),
                        index,
                        "cooldown expired, credential available again"
                    );
                    slot.cooldown_until = None;
                }
            }
        }

        let available: Vec<usize> = state
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.cooldown_until.is_none())
            .map(|(index, _)| index)
            .collect();

        let pick = if let Some(&first_available) = available.first() {
            // Round-robin continuation: first available slot strictly after
            // the last-used index, wrapping to the first available.
            let threshold = state.last_used.map(|used| used + 1).unwrap_or(0);
            available
                .iter()
                .copied()
                .find(|&index| index >= threshold)
                .unwrap_or(first_available)
        } else {
            // Everything is cooling down: pick the slot closest to expiry.
            // It will be retried and likely rate-limited again, which
            // refreshes its cooldown until the shortest window passes.
            let mut best = 0;
            for index in 1..state.slots.len() {
                let best_until = state.slots[best].cooldown_until;
                let this_until = state.slots[index].cooldown_until;
                if let (Some(best_until), Some(this_until)) = (best_until, this_until) {
                    if this_until < best_until {
                        best = index;
                    }
                }
            }
            best
        };

        state.last_used = Some(pick);
        let slot = &state.slots[pick];
        SelectedCredential {
            index: pick,
            masked_id: slot.credential.masked_id(),
            bearer: slot.bearer.clone(),
        }
    }

    /// Put a slot in cooldown after a rate-limit response.
    ///
    /// The deadline is absolute (`now + retry_after + margin`) and always
    /// overwrites any existing cooldown.
    pub async fn record_rate_limited(&self, index: usize, retry_after_secs: u64) {
        let mut state = self.state.lock().await;
        if let Some(slot) = state.slots.get_mut(index) {
            let delay = Duration::from_secs(retry_after_secs).min(MAX_RETRY_AFTER);
            let until = Instant::now() + delay + COOLDOWN_MARGIN;
            info!(
                account_id = %slot.credential.masked_id(),
                index,
                retry_after_secs,
                "credential entering cooldown (rate limited)"
            );
            slot.cooldown_until = Some(until);
        }
    }

    /// Store a freshly exchanged bearer token on a slot.
    pub async fn set_bearer(&self, index: usize, token: String) {
        let mut state = self.state.lock().await;
        if let Some(slot) = state.slots.get_mut(index) {
            slot.bearer = Some(token);
        }
    }

    /// Clone out a slot's credential (for token exchange).
    pub async fn credential(&self, index: usize) -> Option<ClientCredential> {
        let state = self.state.lock().await;
        state.slots.get(index).map(|slot| slot.credential.clone())
    }

    /// Remaining cooldown for a slot, `None` when it is selectable.
    pub async fn cooldown_remaining(&self, index: usize) -> Option<Duration> {
        let state = self.state.lock().await;
        let until = state.slots.get(index).and_then(|slot| slot.cooldown_until)?;
        let now = Instant::now();
        if until > now { Some(until - now) } else { None }
    }

    /// Number of credentials in the pool.
    pub async fn len(&self) -> usize {
        self.state.lock().await.slots.len()
    }

    /// Whether the pool holds no credentials.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    #[cfg(test)]
    async fn force_cooldown(&self, index: usize, duration: Duration) {
        let mut state = self.state.lock().await;
        state.slots[index].cooldown_until = Some(Instant::now() + duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_of(n: usize) -> Pool {
        let credentials = (0..n)
            .map(|i| ClientCredential::new(format!("client-id-{i:04}"), format!("secret-{i}")))
            .collect();
        Pool::new(credentials)
    }

    #[tokio::test]
    async fn round_robin_visits_each_credential_once() {
        let pool = pool_of(5);
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(pool.select().await.index);
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        // Sixth selection wraps back to the start
        assert_eq!(pool.select().await.index, 0);
    }

    #[tokio::test]
    async fn round_robin_continues_after_last_used() {
        let pool = pool_of(3);
        assert_eq!(pool.select().await.index, 0);
        assert_eq!(pool.select().await.index, 1);

        // Slot 2 goes into cooldown; continuation wraps past it to 0
        pool.record_rate_limited(2, 30).await;
        assert_eq!(pool.select().await.index, 0);
        assert_eq!(pool.select().await.index, 1);
    }

    #[tokio::test]
    async fn cooldown_window_is_retry_after_plus_margin() {
        let pool = pool_of(2);
        pool.record_rate_limited(0, 10).await;

        let remaining = pool.cooldown_remaining(0).await.unwrap();
        assert!(
            remaining > Duration::from_secs(10),
            "cooldown must exceed retry-after, got {remaining:?}"
        );
        assert!(
            remaining <= Duration::from_secs(12),
            "cooldown must not exceed retry-after + 2s, got {remaining:?}"
        );
        assert!(pool.cooldown_remaining(1).await.is_none());
    }

    #[tokio::test]
    async fn cooling_credential_is_skipped() {
        let pool = pool_of(3);
        pool.record_rate_limited(1, 30).await;
        for _ in 0..6 {
            assert_ne!(pool.select().await.index, 1);
        }
    }

    #[tokio::test]
    async fn absurd_retry_after_is_clamped() {
        let pool = pool_of(2);
        pool.record_rate_limited(0, u64::MAX).await;

        let remaining = pool.cooldown_remaining(0).await.unwrap();
        assert!(
            remaining <= MAX_RETRY_AFTER + COOLDOWN_MARGIN,
            "wire-provided delay must be clamped, got {remaining:?}"
        );
        // The other slot keeps serving
        assert_eq!(pool.select().await.index, 1);
    }

    #[test]
    #[should_panic(expected = "at least one credential")]
    fn empty_pool_is_rejected_in_debug() {
        let _ = Pool::new(Vec::new());
    }

    #[tokio::test]
    async fn new_rate_limit_overwrites_cooldown() {
        let pool = pool_of(1);
        pool.record_rate_limited(0, 60).await;
        pool.record_rate_limited(0, 5).await;

        let remaining = pool.cooldown_remaining(0).await.unwrap();
        assert!(
            remaining <= Duration::from_secs(7),
            "fresh deadline must replace the longer one, got {remaining:?}"
        );
    }

    #[tokio::test]
    async fn all_delayed_returns_smallest_remaining() {
        let pool = pool_of(2);
        pool.force_cooldown(0, Duration::from_secs(9)).await;
        pool.force_cooldown(1, Duration::from_secs(5)).await;

        let selected = pool.select().await;
        assert_eq!(selected.index, 1);

        // Last-used advances even for a delayed selection
        pool.force_cooldown(0, Duration::from_secs(3)).await;
        pool.force_cooldown(1, Duration::from_secs(20)).await;
        let selected = pool.select().await;
        assert_eq!(selected.index, 0);
    }

    #[tokio::test]
    async fn all_delayed_tie_breaks_by_pool_order() {
        let pool = pool_of(3);
        let until = Duration::from_secs(8);
        for index in 0..3 {
            pool.force_cooldown(index, until).await;
        }
        assert_eq!(pool.select().await.index, 0);
    }

    #[tokio::test]
    async fn expired_cooldown_clears_lazily() {
        let pool = pool_of(2);
        pool.force_cooldown(0, Duration::from_millis(0)).await;
        tokio::time::sleep(Duration::from_millis(2)).await;

        // First check after expiry clears the cooldown and selects slot 0
        assert_eq!(pool.select().await.index, 0);
        assert!(pool.cooldown_remaining(0).await.is_none());
    }

    #[tokio::test]
    async fn bearer_is_none_until_set() {
        let pool = pool_of(1);
        assert!(pool.select().await.bearer.is_none());

        pool.set_bearer(0, "BQtoken".into()).await;
        assert_eq!(pool.select().await.bearer.as_deref(), Some("BQtoken"));
    }

    #[tokio::test]
    async fn masked_id_is_exposed_on_selection() {
        let pool = pool_of(1);
        assert_eq!(pool.select().await.masked_id, "****0000");
    }
}
