//! Credential pool for the follower watcher
//!
//! Manages multiple client credentials with round-robin selection and a
//! per-credential cooldown window driven by rate-limit responses. The
//! pool is the single owner of credential state: bearer tokens are
//! written by `refresh_all`, cooldowns by `record_rate_limited`, and
//! both are read at selection time.
//!
//! Credential lifecycle:
//! 1. Pool is built from the configured credential list, all available
//! 2. `refresh_all` stores a bearer token on every slot (fatal at startup)
//! 3. Selection continues round-robin from the last-used slot
//! 4. A 429 puts the slot in cooldown for `retry-after` plus a margin
//! 5. An expired cooldown is cleared lazily the next time it is checked
//! 6. With every slot in cooldown, selection returns the one closest to
//!    expiry so the caller converges instead of stalling

pub mod pool;
pub mod refresh;

pub use pool::{Pool, SelectedCredential};
pub use refresh::refresh_all;
