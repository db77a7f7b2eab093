//! Session port.
//!
//! Supplies who is signed in and the credential to present. Decoding the
//! credential is the implementor's business; stores only consume the
//! resolved identity.

use crate::domain::Identity;

/// Source of the current identity and bearer credential.
pub trait SessionContext: Send + Sync {
    /// The signed-in identity, or `None` while it is not yet resolved.
    fn identity(&self) -> Option<Identity>;

    /// Raw bearer credential attached to authenticated requests.
    fn credential(&self) -> Option<String>;
}
