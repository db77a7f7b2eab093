//! Marketplace API port.
//!
//! The remote API that owns profiles and listings. Every call is made on
//! behalf of the current session; implementations attach the bearer
//! credential themselves.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{Listing, ListingDraft, ListingId, UserId, UserProfile};
use crate::error::Result;

/// Which status endpoint a sold/available flip goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    MarkSold,
    MarkAvailable,
}

impl StatusChange {
    /// The change that flips a listing away from its current state.
    #[must_use]
    pub const fn flip(currently_sold: bool) -> Self {
        if currently_sold {
            Self::MarkAvailable
        } else {
            Self::MarkSold
        }
    }

    /// `sold` value the listing has once the change is applied.
    #[must_use]
    pub const fn target_sold(self) -> bool {
        matches!(self, Self::MarkSold)
    }

    /// Last path segment of the status endpoint.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::MarkSold => "sold",
            Self::MarkAvailable => "available",
        }
    }
}

impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkSold => write!(f, "mark sold"),
            Self::MarkAvailable => write!(f, "mark available"),
        }
    }
}

/// Remote operations consumed by the profile and listing stores.
///
/// Mutations that touch a listing return the server's complete
/// representation of it, which callers store verbatim.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// `GET /users/profile`
    async fn fetch_profile(&self) -> Result<UserProfile>;

    /// `PUT /users/profile`
    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile>;

    /// `GET /bikes?owner={owner}`
    async fn fetch_owned_listings(&self, owner: &UserId) -> Result<Vec<Listing>>;

    /// `DELETE /bikes/{id}`
    async fn delete_listing(&self, id: &ListingId) -> Result<()>;

    /// `PATCH /bikes/{id}/sold` or `PATCH /bikes/{id}/available`
    async fn change_status(&self, id: &ListingId, change: StatusChange) -> Result<Listing>;

    /// `PUT /bikes/{id}`
    async fn update_listing(&self, id: &ListingId, draft: &ListingDraft) -> Result<Listing>;

    /// `DELETE /bikes/{id}/book/{buyer}`
    async fn remove_buyer(&self, id: &ListingId, buyer: &UserId) -> Result<Listing>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_targets_opposite_state() {
        assert_eq!(StatusChange::flip(false), StatusChange::MarkSold);
        assert_eq!(StatusChange::flip(true), StatusChange::MarkAvailable);
        assert!(StatusChange::MarkSold.target_sold());
        assert!(!StatusChange::MarkAvailable.target_sold());
    }

    #[test]
    fn path_segments() {
        assert_eq!(StatusChange::MarkSold.path_segment(), "sold");
        assert_eq!(StatusChange::MarkAvailable.path_segment(), "available");
    }
}
