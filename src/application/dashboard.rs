//! Wiring of the profile and listing stores behind one session.

use std::sync::Arc;
use std::time::Duration;

use crate::port::{Confirmer, MarketplaceApi, ObserverRegistry, SessionContext, StoreObserver};

use super::edit::EditSession;
use super::listings::ListingCollection;
use super::profile::ProfileStore;
use super::tabs::TabController;

/// The profile page: every store built against the same API, session, and
/// observer registry.
pub struct Dashboard {
    pub profile: ProfileStore,
    pub listings: Arc<ListingCollection>,
    pub editor: EditSession,
    pub tabs: TabController,
    observers: Arc<ObserverRegistry>,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        session: Arc<dyn SessionContext>,
        confirmer: Arc<dyn Confirmer>,
        close_delay: Duration,
    ) -> Self {
        let observers = Arc::new(ObserverRegistry::new());
        let listings = Arc::new(ListingCollection::new(
            Arc::clone(&api),
            Arc::clone(&session),
            confirmer,
            Arc::clone(&observers),
        ));
        Self {
            profile: ProfileStore::new(api, session, Arc::clone(&observers)),
            editor: EditSession::new(Arc::clone(&listings), Arc::clone(&observers), close_delay),
            tabs: TabController::new(Arc::clone(&listings), Arc::clone(&observers)),
            listings,
            observers,
        }
    }

    /// Subscribe to changes from every store.
    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.observers.register(observer);
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("profile", &self.profile)
            .field("listings", &self.listings)
            .field("editor", &self.editor)
            .field("tabs", &self.tabs)
            .finish_non_exhaustive()
    }
}
