//! Who the current session belongs to.

use std::fmt;
use std::str::FromStr;

use super::ids::UserId;

/// Role carried by the session credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    /// Label shown under the profile name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Member => "Member",
        }
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    /// Any role other than `admin` is treated as a regular member.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("admin") {
            Ok(Self::Admin)
        } else {
            Ok(Self::Member)
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
        }
    }
}

/// Resolved identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}
