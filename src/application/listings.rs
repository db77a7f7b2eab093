//! Owned listing collection and its mutations.
//!
//! The collection mirrors the server: every successful mutation swaps in
//! the listing the server returned, and failures leave the entry as it
//! was. Nothing is applied optimistically.
//!
//! Mutations draw a ticket from a monotonic counter when they are issued.
//! A response is applied only if no later-issued operation on the same
//! listing has been applied already, so out-of-order completions resolve
//! to the most recently issued request. Loads take part in the same
//! ordering: a reload keeps entries that a later-issued mutation already
//! replaced, and does not bring back listings deleted after it was issued.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{Listing, ListingDraft, ListingId, Notice, UserId};
use crate::error::{Error, Result};
use crate::port::{
    Confirmer, MarketplaceApi, ObserverRegistry, SessionContext, StatusChange, StoreChange,
};

use super::roster::BuyerRoster;

const LOAD_FAILED: &str = "Failed to load your listings.";
const DELETE_OK: &str = "Listing deleted successfully.";
const DELETE_FAILED: &str = "Failed to delete listing.";
const MARKED_SOLD: &str = "Listing marked as sold.";
const MARKED_AVAILABLE: &str = "Listing marked as available.";
const STATUS_FAILED: &str = "Failed to update listing status.";
const BUYER_REMOVED: &str = "Buyer removed successfully.";
const BUYER_REMOVE_FAILED: &str = "Failed to remove buyer.";

/// Result of an operation gated behind a confirmation prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The user confirmed and the request succeeded.
    Applied(T),
    /// The user declined; no request was issued.
    Declined,
}

impl<T> Outcome<T> {
    #[must_use]
    pub const fn is_declined(&self) -> bool {
        matches!(self, Self::Declined)
    }

    /// The applied value, if any.
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Declined => None,
        }
    }
}

/// What happened when a server listing was merged into the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The entry now holds the server's listing.
    Replaced,
    /// A later-issued operation on the listing was applied first.
    Stale,
    /// The listing is no longer in the collection.
    Missing,
}

/// Server copy returned by an update and what the collection did with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Updated {
    pub listing: Listing,
    pub reconciled: Reconciled,
}

#[derive(Debug, Default)]
struct CollectionState {
    listings: Vec<Listing>,
    notice: Option<Notice>,
    loaded: bool,
    loads_in_flight: usize,
    next_ticket: u64,
    /// Ticket of the newest load applied so far.
    last_load: u64,
    /// Ticket of the last applied operation per listing.
    applied: HashMap<ListingId, u64>,
    /// Deletes applied while a load was in flight, by ticket.
    removed: HashMap<ListingId, u64>,
}

impl CollectionState {
    fn issue(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn position(&self, id: &ListingId) -> Option<usize> {
        self.listings.iter().position(|l| &l.id == id)
    }

    fn is_stale(&self, id: &ListingId, ticket: u64) -> bool {
        self.applied.get(id).is_some_and(|&last| last > ticket)
    }

    /// Merge a load issued under `ticket`.
    ///
    /// Entries replaced by a later-issued mutation keep their current
    /// copy, and listings deleted after the load was issued stay gone.
    /// Returns how many entries were kept from the current collection.
    fn apply_load(&mut self, ticket: u64, fresh: Vec<Listing>) -> usize {
        let mut kept = 0;
        let merged: Vec<Listing> = fresh
            .into_iter()
            .filter(|l| !self.removed.get(&l.id).is_some_and(|&t| t > ticket))
            .map(|l| {
                if !self.is_stale(&l.id, ticket) {
                    return l;
                }
                match self.position(&l.id) {
                    Some(index) => {
                        kept += 1;
                        self.listings[index].clone()
                    }
                    None => l,
                }
            })
            .collect();

        self.applied = merged
            .iter()
            .map(|l| {
                let last = self.applied.get(&l.id).copied().unwrap_or(0);
                (l.id.clone(), last.max(ticket))
            })
            .collect();
        self.removed.retain(|_, t| *t > ticket);
        self.listings = merged;
        self.last_load = ticket;
        self.loaded = true;
        kept
    }
}

/// Listings owned by the current identity.
pub struct ListingCollection {
    api: Arc<dyn MarketplaceApi>,
    session: Arc<dyn SessionContext>,
    confirmer: Arc<dyn Confirmer>,
    observers: Arc<ObserverRegistry>,
    state: RwLock<CollectionState>,
}

impl ListingCollection {
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        session: Arc<dyn SessionContext>,
        confirmer: Arc<dyn Confirmer>,
        observers: Arc<ObserverRegistry>,
    ) -> Self {
        Self {
            api,
            session,
            confirmer,
            observers,
            state: RwLock::new(CollectionState::default()),
        }
    }

    /// Identity whose listings this collection shows, once resolved.
    #[must_use]
    pub fn owner(&self) -> Option<UserId> {
        self.session.identity().map(|identity| identity.user_id)
    }

    /// Load the listings owned by the session's identity.
    pub async fn load_owned(&self) -> Result<Option<usize>> {
        let owner = self.owner();
        self.load(owner.as_ref()).await
    }

    /// Replace the collection with the listings owned by `owner`.
    ///
    /// Returns `Ok(None)` without issuing a request when `owner` is not
    /// resolved yet. On failure the previous collection stays visible.
    pub async fn load(&self, owner: Option<&UserId>) -> Result<Option<usize>> {
        let Some(owner) = owner else {
            debug!("Owner not resolved, skipping listing load");
            return Ok(None);
        };

        let ticket = {
            let mut state = self.state.write();
            state.loads_in_flight += 1;
            state.issue()
        };
        self.observers.notify_all(StoreChange::ListingsLoading);
        info!(owner = %owner, "Loading owned listings");

        match self.api.fetch_owned_listings(owner).await {
            Ok(listings) => {
                let listings = dedupe(listings);
                let (count, kept, superseded) = {
                    let mut state = self.state.write();
                    state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
                    let superseded = ticket < state.last_load;
                    let kept = if superseded {
                        0
                    } else {
                        state.apply_load(ticket, listings)
                    };
                    if state.loads_in_flight == 0 {
                        state.removed.clear();
                    }
                    (state.listings.len(), kept, superseded)
                };
                if superseded {
                    debug!(ticket, "Dropping load superseded by a newer one");
                    return Ok(Some(count));
                }
                debug!(count, kept, "Owned listings loaded");
                self.observers
                    .notify_all(StoreChange::ListingsLoaded { count });
                Ok(Some(count))
            }
            Err(err) => {
                warn!(error = %err, "Failed to load owned listings");
                {
                    let mut state = self.state.write();
                    state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
                    if state.loads_in_flight == 0 {
                        state.removed.clear();
                    }
                    state.notice = Some(Notice::load_failure(&err, LOAD_FAILED));
                }
                self.observers.notify_all(StoreChange::ListingsLoadFailed);
                self.observers.notify_all(StoreChange::ListingNoticeChanged);
                Err(err)
            }
        }
    }

    /// Delete a listing after the user confirms.
    pub async fn delete(&self, id: &ListingId) -> Result<Outcome<ListingId>> {
        let listing = self.require(id)?;
        let prompt = format!("Delete \"{}\"? This cannot be undone.", listing.title());
        if !self.confirmer.confirm(&prompt) {
            debug!(listing_id = %id, "Delete declined");
            return Ok(Outcome::Declined);
        }

        let ticket = self.state.write().issue();
        info!(listing_id = %id, "Deleting listing");

        match self.api.delete_listing(id).await {
            Ok(()) => {
                let removed = {
                    let mut state = self.state.write();
                    let removed = state.position(id).map(|index| state.listings.remove(index));
                    state.applied.remove(id);
                    if state.loads_in_flight > 0 {
                        state.removed.insert(id.clone(), ticket);
                    }
                    state.notice = Some(Notice::success(DELETE_OK));
                    removed.is_some()
                };
                if removed {
                    self.observers
                        .notify_all(StoreChange::ListingRemoved(id.clone()));
                }
                self.observers.notify_all(StoreChange::ListingNoticeChanged);
                Ok(Outcome::Applied(id.clone()))
            }
            Err(err) => {
                warn!(listing_id = %id, error = %err, "Delete failed");
                self.fail(&err, DELETE_FAILED);
                Err(err)
            }
        }
    }

    /// Flip a listing between sold and available.
    ///
    /// The endpoint is chosen from the entry's current `sold` flag.
    pub async fn toggle_sold(&self, id: &ListingId) -> Result<Listing> {
        let listing = self.require(id)?;
        let change = StatusChange::flip(listing.sold);

        let ticket = self.state.write().issue();
        info!(listing_id = %id, change = %change, "Changing listing status");

        match self.api.change_status(id, change).await {
            Ok(updated) => {
                let notice = if updated.sold {
                    MARKED_SOLD
                } else {
                    MARKED_AVAILABLE
                };
                self.reconcile(ticket, updated.clone(), Some(Notice::success(notice)));
                Ok(updated)
            }
            Err(err) => {
                warn!(listing_id = %id, error = %err, "Status change failed");
                self.fail(&err, STATUS_FAILED);
                Err(err)
            }
        }
    }

    /// Send edited fields and store the server's listing.
    ///
    /// Failures are returned to the caller (the edit surface shows them);
    /// the collection banner is left alone. An accepted update whose
    /// response lost to a newer operation comes back as
    /// [`Reconciled::Stale`] or [`Reconciled::Missing`].
    pub async fn update(&self, id: &ListingId, draft: &ListingDraft) -> Result<Updated> {
        let ticket = self.state.write().issue();
        info!(listing_id = %id, "Updating listing");

        match self.api.update_listing(id, draft).await {
            Ok(listing) => {
                let reconciled = self.reconcile(ticket, listing.clone(), None);
                Ok(Updated {
                    listing,
                    reconciled,
                })
            }
            Err(err) => {
                warn!(listing_id = %id, error = %err, "Update failed");
                Err(err)
            }
        }
    }

    /// Remove an interested buyer after the user confirms.
    ///
    /// The whole listing is replaced with the server's copy rather than
    /// filtering the buyer out locally.
    pub async fn remove_buyer(
        &self,
        listing_id: &ListingId,
        buyer_id: &UserId,
    ) -> Result<Outcome<Listing>> {
        let listing = self.require(listing_id)?;
        let name = listing
            .booked_buyers
            .iter()
            .find(|b| &b.user_id == buyer_id)
            .map_or_else(|| buyer_id.to_string(), |b| b.username.clone());
        let prompt = format!("Remove {name} from buyers of \"{}\"?", listing.title());
        if !self.confirmer.confirm(&prompt) {
            debug!(listing_id = %listing_id, buyer_id = %buyer_id, "Buyer removal declined");
            return Ok(Outcome::Declined);
        }

        let ticket = self.state.write().issue();
        info!(listing_id = %listing_id, buyer_id = %buyer_id, "Removing buyer");

        match self.api.remove_buyer(listing_id, buyer_id).await {
            Ok(updated) => {
                self.reconcile(ticket, updated.clone(), Some(Notice::success(BUYER_REMOVED)));
                Ok(Outcome::Applied(updated))
            }
            Err(err) => {
                warn!(listing_id = %listing_id, error = %err, "Buyer removal failed");
                self.fail(&err, BUYER_REMOVE_FAILED);
                Err(err)
            }
        }
    }

    /// Drop the listing-management banner.
    pub fn clear_notice(&self) {
        let cleared = self.state.write().notice.take().is_some();
        if cleared {
            self.observers.notify_all(StoreChange::ListingNoticeChanged);
        }
    }

    /// Current banner, if any.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.state.read().notice.clone()
    }

    /// Snapshot of the collection in server order.
    #[must_use]
    pub fn listings(&self) -> Vec<Listing> {
        self.state.read().listings.clone()
    }

    #[must_use]
    pub fn get(&self, id: &ListingId) -> Option<Listing> {
        let state = self.state.read();
        state.position(id).map(|index| state.listings[index].clone())
    }

    /// Buyer roster for one listing.
    #[must_use]
    pub fn roster(&self, id: &ListingId) -> Option<BuyerRoster> {
        self.get(id).map(|listing| BuyerRoster::for_listing(&listing))
    }

    /// Buyer rosters for every listing, in collection order.
    #[must_use]
    pub fn rosters(&self) -> Vec<BuyerRoster> {
        self.state
            .read()
            .listings
            .iter()
            .map(BuyerRoster::for_listing)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().listings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().listings.is_empty()
    }

    /// Whether a load has completed successfully.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().loads_in_flight > 0
    }

    fn require(&self, id: &ListingId) -> Result<Listing> {
        self.get(id)
            .ok_or_else(|| Error::ListingNotFound(id.to_string()))
    }

    fn fail(&self, err: &Error, fallback: &str) {
        self.state.write().notice = Some(Notice::mutation_failure(err, fallback));
        self.observers.notify_all(StoreChange::ListingNoticeChanged);
    }

    /// Swap in the server's listing unless a newer operation already won.
    fn reconcile(&self, ticket: u64, listing: Listing, notice: Option<Notice>) -> Reconciled {
        let id = listing.id.clone();
        let announces = notice.is_some();
        let outcome = {
            let mut state = self.state.write();
            if state.is_stale(&id, ticket) {
                Reconciled::Stale
            } else if let Some(index) = state.position(&id) {
                state.listings[index] = listing;
                state.applied.insert(id.clone(), ticket);
                if notice.is_some() {
                    state.notice = notice;
                }
                Reconciled::Replaced
            } else {
                Reconciled::Missing
            }
        };

        match outcome {
            Reconciled::Replaced => {
                self.observers
                    .notify_all(StoreChange::ListingReplaced(id));
                if announces {
                    self.observers.notify_all(StoreChange::ListingNoticeChanged);
                }
            }
            Reconciled::Stale => {
                debug!(listing_id = %id, ticket, "Dropping stale listing response");
                self.observers
                    .notify_all(StoreChange::StaleResponseDropped(id));
            }
            Reconciled::Missing => {
                warn!(listing_id = %id, "Response for listing not in collection, ignoring");
            }
        }
        outcome
    }
}

impl std::fmt::Debug for ListingCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("ListingCollection")
            .field("listings", &state.listings.len())
            .field("loaded", &state.loaded)
            .field("loads_in_flight", &state.loads_in_flight)
            .finish_non_exhaustive()
    }
}

/// Keep the first occurrence of every id.
fn dedupe(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::with_capacity(listings.len());
    listings
        .into_iter()
        .filter(|listing| {
            let fresh = seen.insert(listing.id.clone());
            if !fresh {
                warn!(listing_id = %listing.id, "Duplicate listing id in response, dropping");
            }
            fresh
        })
        .collect()
}
