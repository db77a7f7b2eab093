//! Per-listing view of interested buyers.

use crate::domain::{Buyer, Listing, ListingId};
use crate::error::Result;

use super::listings::{ListingCollection, Outcome};

/// Shown when nobody has expressed interest in a listing yet.
pub const NO_BUYERS: &str = "No buyers have shown interest in this listing yet.";

/// One buyer with their 1-based display position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub index: usize,
    pub listing_id: ListingId,
    pub buyer: Buyer,
}

impl RosterEntry {
    /// Remove this buyer from the listing.
    ///
    /// Routed through the collection so the listing is re-synced from the
    /// server's response.
    pub async fn remove(&self, collection: &ListingCollection) -> Result<Outcome<Listing>> {
        collection
            .remove_buyer(&self.listing_id, &self.buyer.user_id)
            .await
    }
}

/// Buyers of one listing, derived from its `bookedBuyers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerRoster {
    listing_id: ListingId,
    title: String,
    sold: bool,
    entries: Vec<RosterEntry>,
}

impl BuyerRoster {
    #[must_use]
    pub fn for_listing(listing: &Listing) -> Self {
        let entries = listing
            .booked_buyers
            .iter()
            .enumerate()
            .map(|(i, buyer)| RosterEntry {
                index: i + 1,
                listing_id: listing.id.clone(),
                buyer: buyer.clone(),
            })
            .collect();
        Self {
            listing_id: listing.id.clone(),
            title: listing.title(),
            sold: listing.sold,
            entries,
        }
    }

    #[must_use]
    pub fn listing_id(&self) -> &ListingId {
        &self.listing_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn is_sold(&self) -> bool {
        self.sold
    }

    #[must_use]
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Explanatory text when the roster is empty.
    #[must_use]
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_BUYERS)
    }
}
