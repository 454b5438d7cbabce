//! Outbound notification abstraction
//!
//! Defines the `Notifier` trait that decouples the poll cycle from the
//! message provider. `TwilioNotifier` sends one SMS per new follower;
//! tests substitute a recording implementation.

pub mod twilio;

pub use twilio::{TWILIO_API_BASE, TwilioNotifier};

use common::FollowerRecord;
use std::future::Future;
use std::pin::Pin;

/// Errors from sending a notification.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("notification request failed: {0}")]
    Http(String),

    #[error("notification rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Result alias for notification operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Abstraction over the outbound alert channel.
///
/// One call per new follower; the observer awaits each send before the
/// next, so implementations do not need internal ordering.
///
/// Uses a `Pin<Box<dyn Future>>` return type for dyn-compatibility
/// (`Arc<dyn Notifier>`).
pub trait Notifier: Send + Sync {
    /// Send one alert for a newly detected follower.
    fn notify<'a>(
        &'a self,
        follower: &'a FollowerRecord,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
