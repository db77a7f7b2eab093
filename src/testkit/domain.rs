//! Builders for domain values used across tests.

use rust_decimal_macros::dec;

use crate::adapter::outbound::session::StaticSession;
use crate::domain::{Buyer, Identity, Listing, ListingId, Role, UserId};

/// An available listing with plausible field values.
pub fn listing(id: &str) -> Listing {
    Listing {
        id: ListingId::new(id),
        brand: "Royal Enfield".into(),
        model: "Classic 350".into(),
        location: "Pune".into(),
        price: dec!(150000),
        description: "Single owner, serviced on time".into(),
        color: "Black".into(),
        owners_count: 1,
        kilometres_run: 12_000,
        model_year: 2021,
        images: vec![format!("/uploads/{id}.jpg")],
        sold: false,
        booked_buyers: Vec::new(),
    }
}

/// A listing with the given buyers booked.
pub fn listing_with_buyers(id: &str, buyers: Vec<Buyer>) -> Listing {
    Listing {
        booked_buyers: buyers,
        ..listing(id)
    }
}

pub fn buyer(user_id: &str, username: &str) -> Buyer {
    Buyer {
        user_id: UserId::new(user_id),
        username: username.into(),
        contact: "9800000000".into(),
        location: "Mumbai".into(),
    }
}

/// Resolved member session for `user_id`.
pub fn session_for(user_id: &str) -> StaticSession {
    StaticSession::new(
        Some(Identity::new(user_id, Role::Member)),
        Some("test-token".into()),
    )
}

pub fn admin_session_for(user_id: &str) -> StaticSession {
    StaticSession::new(
        Some(Identity::new(user_id, Role::Admin)),
        Some("test-token".into()),
    )
}
