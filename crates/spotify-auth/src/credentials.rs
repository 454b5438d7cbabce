//! Application credential type
//!
//! One registered API application: a public client id plus its secret.
//! The pool owns a slot per credential; only the masked id ever reaches
//! logs or error messages.

use common::Secret;

/// One client id/secret pair used to spread request load.
#[derive(Clone)]
pub struct ClientCredential {
    /// Public client identifier
    pub id: String,
    /// Client secret for the client-credentials grant
    pub secret: Secret<String>,
}

impl ClientCredential {
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: Secret::new(secret.into()),
        }
    }

    /// Identifier safe for logging: `****` plus the last four characters
    /// of the client id.
    pub fn masked_id(&self) -> String {
        // Client ids are hex, but count chars rather than bytes so
        // multibyte input still keeps a visible tail.
        let tail_start = self.id.chars().count().saturating_sub(4);
        let tail: String = self.id.chars().skip(tail_start).collect();
        format!("****{tail}")
    }
}

impl std::fmt::Debug for ClientCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredential")
            .field("id", &self.masked_id())
            .field("secret", &self.secret)
            .finish()
    }
}
