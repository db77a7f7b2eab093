//! In-memory marketplace backend.
//!
//! Behaves like the real service for the calls the stores make: listing
//! mutations edit the stored copy and return it whole. A failure armed
//! with [`FakeMarketplace::fail_next`] is consumed by the next call, which
//! is still recorded. A listing armed with [`FakeMarketplace::respond_next`]
//! replaces the stored copy on the next listing mutation, the way a server
//! that changes other fields as a side effect would answer.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Listing, ListingDraft, ListingId, UserId, UserProfile};
use crate::error::{ApiError, Error, Result};
use crate::port::{MarketplaceApi, StatusChange};

/// A request the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchProfile,
    SaveProfile(UserProfile),
    FetchListings(UserId),
    Delete(ListingId),
    ChangeStatus(ListingId, StatusChange),
    Update(ListingId, ListingDraft),
    RemoveBuyer(ListingId, UserId),
}

#[derive(Debug, Default)]
struct Backend {
    owner: UserId,
    profile: UserProfile,
    listings: Vec<Listing>,
    failures: VecDeque<ApiError>,
    responses: VecDeque<Listing>,
    calls: Vec<Call>,
}

impl Backend {
    fn record(&mut self, call: Call) -> Result<()> {
        self.calls.push(call);
        match self.failures.pop_front() {
            Some(err) => Err(Error::Api(err)),
            None => Ok(()),
        }
    }

    fn listing_mut(&mut self, id: &ListingId) -> Result<&mut Listing> {
        self.listings
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Apply `change` to the stored listing, or swap in a scripted response.
    fn mutate(&mut self, id: &ListingId, change: impl FnOnce(&mut Listing)) -> Result<Listing> {
        let scripted = self.responses.pop_front();
        let listing = self.listing_mut(id)?;
        match scripted {
            Some(response) => *listing = response,
            None => change(listing),
        }
        Ok(listing.clone())
    }
}

fn not_found(id: &ListingId) -> Error {
    Error::Api(ApiError::Status {
        status: 404,
        message: Some(format!("Listing {id} not found")),
    })
}

/// Scriptable [`MarketplaceApi`] backed by a vector of listings.
#[derive(Debug, Default)]
pub struct FakeMarketplace {
    backend: Mutex<Backend>,
}

impl FakeMarketplace {
    /// An empty marketplace whose listings belong to `owner`.
    pub fn new(owner: &str) -> Self {
        Self::with_listings(owner, Vec::new())
    }

    pub fn with_listings(owner: &str, listings: Vec<Listing>) -> Self {
        Self {
            backend: Mutex::new(Backend {
                owner: UserId::new(owner),
                listings,
                ..Backend::default()
            }),
        }
    }

    /// Replace the stored listings.
    pub fn set_listings(&self, owner: &str, listings: Vec<Listing>) {
        let mut backend = self.backend.lock();
        backend.owner = UserId::new(owner);
        backend.listings = listings;
    }

    pub fn set_profile(&self, profile: UserProfile) {
        self.backend.lock().profile = profile;
    }

    /// Fail the next call with `status` and an optional server message.
    pub fn fail_next(&self, status: u16, message: Option<&str>) {
        self.backend.lock().failures.push_back(ApiError::Status {
            status,
            message: message.map(str::to_string),
        });
    }

    /// Answer the next listing mutation with `listing` instead of applying it.
    pub fn respond_next(&self, listing: Listing) {
        self.backend.lock().responses.push_back(listing);
    }

    /// Fail the next call as if the request never reached the server.
    pub fn fail_next_unauthenticated(&self) {
        self.backend
            .lock()
            .failures
            .push_back(ApiError::Unauthenticated);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.backend.lock().calls.clone()
    }

    /// Current server-side copy of a listing.
    pub fn stored(&self, id: &str) -> Option<Listing> {
        let id = ListingId::new(id);
        self.backend
            .lock()
            .listings
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }
}

#[async_trait]
impl MarketplaceApi for FakeMarketplace {
    async fn fetch_profile(&self) -> Result<UserProfile> {
        let mut backend = self.backend.lock();
        backend.record(Call::FetchProfile)?;
        Ok(backend.profile.clone())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        let mut backend = self.backend.lock();
        backend.record(Call::SaveProfile(profile.clone()))?;
        backend.profile = profile.clone();
        Ok(profile.clone())
    }

    async fn fetch_owned_listings(&self, owner: &UserId) -> Result<Vec<Listing>> {
        let mut backend = self.backend.lock();
        backend.record(Call::FetchListings(owner.clone()))?;
        if &backend.owner == owner {
            Ok(backend.listings.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn delete_listing(&self, id: &ListingId) -> Result<()> {
        let mut backend = self.backend.lock();
        backend.record(Call::Delete(id.clone()))?;
        let before = backend.listings.len();
        backend.listings.retain(|l| &l.id != id);
        if backend.listings.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn change_status(&self, id: &ListingId, change: StatusChange) -> Result<Listing> {
        let mut backend = self.backend.lock();
        backend.record(Call::ChangeStatus(id.clone(), change))?;
        backend.mutate(id, |listing| listing.sold = change.target_sold())
    }

    async fn update_listing(&self, id: &ListingId, draft: &ListingDraft) -> Result<Listing> {
        let mut backend = self.backend.lock();
        backend.record(Call::Update(id.clone(), draft.clone()))?;
        backend.mutate(id, |listing| {
            listing.brand.clone_from(&draft.brand);
            listing.model.clone_from(&draft.model);
            listing.location.clone_from(&draft.location);
            listing.price = draft.price;
            listing.description.clone_from(&draft.description);
            listing.color.clone_from(&draft.color);
            listing.owners_count = draft.owners_count;
            listing.kilometres_run = draft.kilometres_run;
            listing.model_year = draft.model_year;
        })
    }

    async fn remove_buyer(&self, listing_id: &ListingId, buyer_id: &UserId) -> Result<Listing> {
        let mut backend = self.backend.lock();
        backend.record(Call::RemoveBuyer(listing_id.clone(), buyer_id.clone()))?;
        backend.mutate(listing_id, |listing| {
            listing.booked_buyers.retain(|b| &b.user_id != buyer_id);
        })
    }
}
