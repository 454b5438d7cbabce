//! Follower list diffing
//!
//! Pure comparison of two snapshots keyed by `uri`. Output order is
//! stable relative to the inputs: `added` follows the new list,
//! `removed` follows the old list.

use std::collections::HashSet;

use common::FollowerRecord;

/// Added and removed followers between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerDiff {
    pub added: Vec<FollowerRecord>,
    pub removed: Vec<FollowerRecord>,
}

/// Compare the freshly fetched list against the previous snapshot.
pub fn diff(new: &[FollowerRecord], old: &[FollowerRecord]) -> FollowerDiff {
    let old_uris: HashSet<&str> = old.iter().map(|f| f.uri.as_str()).collect();
    let new_uris: HashSet<&str> = new.iter().map(|f| f.uri.as_str()).collect();

    FollowerDiff {
        added: new
            .iter()
            .filter(|f| !old_uris.contains(f.uri.as_str()))
            .cloned()
            .collect(),
        removed: old
            .iter()
            .filter(|f| !new_uris.contains(f.uri.as_str()))
            .cloned()
            .collect(),
    }
}
