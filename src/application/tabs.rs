//! Dashboard tab selection.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::Tab;
use crate::error::Result;
use crate::port::{ObserverRegistry, StoreChange};

use super::listings::ListingCollection;

#[derive(Debug, Default)]
struct TabState {
    current: Tab,
    listings_requested: bool,
}

/// Selects between the profile, listings, and customers views.
///
/// The first time a listing tab is shown the collection is loaded; later
/// visits reuse whatever was loaded. Switching tabs clears the
/// listing-management banner so it does not reappear on re-entry, and
/// leaves any open edit draft alone.
pub struct TabController {
    collection: Arc<ListingCollection>,
    observers: Arc<ObserverRegistry>,
    state: Mutex<TabState>,
}

impl TabController {
    pub fn new(collection: Arc<ListingCollection>, observers: Arc<ObserverRegistry>) -> Self {
        Self {
            collection,
            observers,
            state: Mutex::new(TabState::default()),
        }
    }

    #[must_use]
    pub fn current(&self) -> Tab {
        self.state.lock().current
    }

    /// Show `tab`, loading listings on first entry to a listing tab.
    ///
    /// The automatic load is attempted at most once per controller; a
    /// failed load is not retried. It waits until the session identity is
    /// resolved.
    pub async fn select(&self, tab: Tab) -> Result<()> {
        let owner = self.collection.owner();
        let (changed, trigger) = {
            let mut state = self.state.lock();
            let changed = state.current != tab;
            state.current = tab;
            let trigger = tab.needs_listings() && !state.listings_requested && owner.is_some();
            if trigger {
                state.listings_requested = true;
            }
            (changed, trigger)
        };

        if changed {
            self.collection.clear_notice();
            self.observers.notify_all(StoreChange::TabSelected(tab));
        }

        if trigger {
            debug!(tab = %tab, "First listing tab entry, loading listings");
            self.collection.load(owner.as_ref()).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TabController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabController")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
