//! Follower identity value type

use serde::{Deserialize, Serialize};

/// One follower as observed in a profile's follower list.
///
/// Two records refer to the same follower exactly when their `uri` fields
/// match; `name` is display-only and may change between observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerRecord {
    /// Display name at observation time.
    pub name: String,
    /// Stable profile identifier (e.g. `spotify:user:...`).
    pub uri: String,
}

impl FollowerRecord {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_name_and_uri_fields() {
        let record = FollowerRecord::new("Ayşe", "spotify:user:ayse42");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Ayşe");
        assert_eq!(json["uri"], "spotify:user:ayse42");
    }

    #[test]
    fn equality_covers_both_fields() {
        let a = FollowerRecord::new("A", "spotify:user:1");
        let b = FollowerRecord::new("A", "spotify:user:1");
        let c = FollowerRecord::new("B", "spotify:user:1");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn deserializes_from_api_shape() {
        let record: FollowerRecord =
            serde_json::from_str(r#"{"name":"Mehmet","uri":"spotify:user:m"}"#).unwrap();
        assert_eq!(record.name, "Mehmet");
        assert_eq!(record.uri, "spotify:user:m");
    }
}
