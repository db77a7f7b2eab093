//! Session whose identity resolves after construction.

use parking_lot::RwLock;

use crate::domain::{Identity, Role};
use crate::port::SessionContext;

/// Starts unresolved, like a session still decoding its token.
#[derive(Debug, Default)]
pub struct PendingSession {
    identity: RwLock<Option<Identity>>,
}

impl PendingSession {
    /// Resolve to a member identity.
    pub fn resolve(&self, user_id: &str) {
        *self.identity.write() = Some(Identity::new(user_id, Role::Member));
    }
}

impl SessionContext for PendingSession {
    fn identity(&self) -> Option<Identity> {
        self.identity.read().clone()
    }

    fn credential(&self) -> Option<String> {
        self.identity.read().as_ref().map(|_| "test-token".to_string())
    }
}
