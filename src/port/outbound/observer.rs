//! Observer port for store change notifications.
//!
//! Stores publish a [`StoreChange`] after every state transition. A view
//! layer subscribes through [`ObserverRegistry`] and re-reads whatever store
//! state it renders; events carry just enough to decide what to redraw.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::{DraftField, ListingId, ProfileField, Tab};

/// State transitions published by the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    /// Profile fetch resolved successfully.
    ProfileLoaded,
    /// Profile fetch failed; defaults remain.
    ProfileLoadFailed,
    /// A profile field was edited locally.
    ProfileEdited(ProfileField),
    /// A profile save request was issued.
    ProfileSaving,
    /// A profile save resolved (`success` tells which way).
    ProfileSaved { success: bool },

    /// Listing fetch was issued.
    ListingsLoading,
    /// Listing collection replaced by a fetch.
    ListingsLoaded { count: usize },
    /// Listing fetch failed; the previous collection stays.
    ListingsLoadFailed,
    /// A listing entry was replaced with the server's representation.
    ListingReplaced(ListingId),
    /// A listing entry was removed after a delete.
    ListingRemoved(ListingId),
    /// A mutation response arrived after a newer one was applied.
    StaleResponseDropped(ListingId),
    /// The listing-management banner changed or was cleared.
    ListingNoticeChanged,

    /// An edit draft was opened for a listing.
    DraftOpened(ListingId),
    /// One draft field changed.
    DraftEdited(DraftField),
    /// The draft was sent to the server.
    DraftSubmitting(ListingId),
    /// The server accepted the draft; auto-close is pending.
    DraftAccepted(ListingId),
    /// The server rejected the draft; it stays open.
    DraftRejected(ListingId),
    /// The edit modal closed.
    DraftClosed,

    /// The visible dashboard tab changed.
    TabSelected(Tab),
}

/// Trait for store change subscribers.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `on_change` is called synchronously from inside store operations and
///   should return quickly
/// - Subscribers must not call back into the publishing store's mutation
///   operations from `on_change`
pub trait StoreObserver: Send + Sync {
    /// Handle a change.
    fn on_change(&self, change: &StoreChange);
}

/// Registry of observers (composite pattern).
///
/// Broadcasts changes to all registered observers. Shared between the
/// stores of one dashboard.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: RwLock<Vec<Arc<dyn StoreObserver>>>,
}

impl ObserverRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn register(&self, observer: Arc<dyn StoreObserver>) {
        self.observers.write().push(observer);
    }

    /// Notify all registered observers.
    pub fn notify_all(&self, change: StoreChange) {
        // Snapshot so observers may register others without deadlocking.
        let observers = self.observers.read().clone();
        for observer in &observers {
            observer.on_change(&change);
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}

/// A no-op observer.
pub struct NullObserver;

impl StoreObserver for NullObserver {
    fn on_change(&self, _change: &StoreChange) {}
}

/// An observer that logs changes via tracing.
pub struct LogObserver;

impl StoreObserver for LogObserver {
    fn on_change(&self, change: &StoreChange) {
        use tracing::{debug, warn};
        match change {
            StoreChange::ProfileLoadFailed => warn!("Profile load failed"),
            StoreChange::ProfileSaved { success: false } => warn!("Profile save failed"),
            StoreChange::ListingsLoadFailed => warn!("Listing load failed"),
            StoreChange::ListingsLoaded { count } => debug!(count, "Listings loaded"),
            StoreChange::ListingReplaced(id) => debug!(listing_id = %id, "Listing replaced"),
            StoreChange::ListingRemoved(id) => debug!(listing_id = %id, "Listing removed"),
            StoreChange::StaleResponseDropped(id) => {
                debug!(listing_id = %id, "Stale response dropped");
            }
            StoreChange::DraftRejected(id) => warn!(listing_id = %id, "Draft rejected"),
            StoreChange::TabSelected(tab) => debug!(tab = %tab, "Tab selected"),
            other => debug!(change = ?other, "Store changed"),
        }
    }
}
