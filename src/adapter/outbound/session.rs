//! Session resolved once at startup.

use tracing::debug;

use crate::domain::{Identity, Role};
use crate::port::SessionContext;

/// Environment variable holding the bearer credential.
pub const TOKEN_VAR: &str = "BIKEYARD_TOKEN";
/// Environment variable holding the signed-in user id.
pub const USER_ID_VAR: &str = "BIKEYARD_USER_ID";
/// Environment variable holding the role (`admin` or anything else).
pub const ROLE_VAR: &str = "BIKEYARD_ROLE";

/// Fixed identity and credential.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    identity: Option<Identity>,
    credential: Option<String>,
}

impl StaticSession {
    #[must_use]
    pub fn new(identity: Option<Identity>, credential: Option<String>) -> Self {
        Self {
            identity,
            credential,
        }
    }

    /// Read the session from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the session through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let role = read(ROLE_VAR)
            .map(|raw| raw.parse::<Role>().unwrap_or_default())
            .unwrap_or_default();
        let identity = read(USER_ID_VAR).map(|user_id| Identity::new(user_id, role));
        let credential = read(TOKEN_VAR);
        debug!(
            resolved = identity.is_some(),
            has_credential = credential.is_some(),
            "Session read from environment"
        );

        Self::new(identity, credential)
    }
}

impl SessionContext for StaticSession {
    fn identity(&self) -> Option<Identity> {
        self.identity.clone()
    }

    fn credential(&self) -> Option<String> {
        self.credential.clone()
    }
}
