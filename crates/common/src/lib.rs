//! Common types for the follower watcher

mod error;
mod follower;
mod secret;

pub use error::{Error, Result};
pub use follower::FollowerRecord;
pub use secret::Secret;
