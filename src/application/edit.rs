//! Modal edit session over a single listing.
//!
//! ```text
//! Closed ──open──▶ Editing ──submit──▶ Submitting ──ok──▶ Accepted ──delay──▶ Closed
//!                     ▲                    │
//!                     └──────── err ───────┘ (Failed, draft kept)
//! ```
//!
//! The draft is detached from the collection until `submit`. Every open
//! and close bumps an epoch; late submit results and the auto-close timer
//! only act if the epoch they started under is still current.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::{DraftChange, Listing, ListingDraft, ListingId};
use crate::error::{EditError, Result};
use crate::port::{ObserverRegistry, StoreChange};

use super::listings::{ListingCollection, Reconciled};

const UPDATE_OK: &str = "Listing updated successfully!";
const UPDATE_SUPERSEDED: &str = "Listing updated, but a newer change is already shown.";
const UPDATE_FAILED: &str = "Failed to update listing.";

/// Where an open draft is in its submit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftPhase {
    Editing,
    Submitting,
    /// Server rejected the draft; the message is shown in the modal.
    Failed(String),
    /// Server accepted the draft; the modal closes after the delay.
    Accepted(String),
}

/// The draft currently open in the modal.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenDraft {
    pub listing_id: ListingId,
    pub draft: ListingDraft,
    pub phase: DraftPhase,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Closed,
    Open(OpenDraft),
}

#[derive(Debug, Default)]
struct Inner {
    epoch: u64,
    state: EditState,
}

/// Single-slot edit modal.
pub struct EditSession {
    collection: Arc<ListingCollection>,
    observers: Arc<ObserverRegistry>,
    close_delay: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl EditSession {
    pub fn new(
        collection: Arc<ListingCollection>,
        observers: Arc<ObserverRegistry>,
        close_delay: Duration,
    ) -> Self {
        Self {
            collection,
            observers,
            close_delay,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Open the modal on a fresh copy of `listing`'s editable fields.
    ///
    /// Replaces any draft already open.
    pub fn open(&self, listing: &Listing) {
        {
            let mut inner = self.inner.lock();
            inner.epoch += 1;
            inner.state = EditState::Open(OpenDraft {
                listing_id: listing.id.clone(),
                draft: listing.draft(),
                phase: DraftPhase::Editing,
            });
        }
        debug!(listing_id = %listing.id, "Edit draft opened");
        self.observers
            .notify_all(StoreChange::DraftOpened(listing.id.clone()));
    }

    /// Change one draft field.
    pub fn change_field(&self, change: DraftChange) -> std::result::Result<(), EditError> {
        let field = change.field();
        {
            let mut inner = self.inner.lock();
            let EditState::Open(open) = &mut inner.state else {
                return Err(EditError::NotOpen);
            };
            open.draft.apply(change);
        }
        self.observers.notify_all(StoreChange::DraftEdited(field));
        Ok(())
    }

    /// Send the draft through the collection's update.
    ///
    /// On success the modal shows a confirmation and closes itself after
    /// the configured delay. When the server accepted the draft but a newer
    /// operation on the listing was applied first, the confirmation says so
    /// and the collection keeps the newer copy. On failure it stays open
    /// with the error and the draft intact. If the modal was closed or reopened while the
    /// request was in flight, the result is returned but not shown.
    pub async fn submit(&self) -> Result<Listing> {
        let (epoch, listing_id, draft) = {
            let mut inner = self.inner.lock();
            let epoch = inner.epoch;
            let EditState::Open(open) = &mut inner.state else {
                return Err(EditError::NotOpen.into());
            };
            open.phase = DraftPhase::Submitting;
            (epoch, open.listing_id.clone(), open.draft.clone())
        };
        self.observers
            .notify_all(StoreChange::DraftSubmitting(listing_id.clone()));
        info!(listing_id = %listing_id, "Submitting listing draft");

        let result = self.collection.update(&listing_id, &draft).await;

        let phase = match &result {
            Ok(updated) if updated.reconciled == Reconciled::Replaced => {
                DraftPhase::Accepted(UPDATE_OK.to_string())
            }
            Ok(updated) => {
                debug!(
                    listing_id = %listing_id,
                    reconciled = ?updated.reconciled,
                    "Update accepted but a newer copy is shown"
                );
                DraftPhase::Accepted(UPDATE_SUPERSEDED.to_string())
            }
            Err(err) => DraftPhase::Failed(err.display_message(UPDATE_FAILED)),
        };
        let result = result.map(|updated| updated.listing);
        let accepted = matches!(phase, DraftPhase::Accepted(_));

        let current = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            match &mut inner.state {
                EditState::Open(open) if inner.epoch == epoch => {
                    open.phase = phase;
                    true
                }
                _ => false,
            }
        };
        if !current {
            debug!(listing_id = %listing_id, "Edit modal changed during submit, result not shown");
            return result;
        }

        if accepted {
            self.observers
                .notify_all(StoreChange::DraftAccepted(listing_id));
            self.schedule_close(epoch);
        } else {
            self.observers
                .notify_all(StoreChange::DraftRejected(listing_id));
        }
        result
    }

    /// Discard the draft. Nothing is sent.
    pub fn close(&self) {
        if close_if(&self.inner, None) {
            self.observers.notify_all(StoreChange::DraftClosed);
        }
    }

    #[must_use]
    pub fn state(&self) -> EditState {
        self.inner.lock().state.clone()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.inner.lock().state, EditState::Open(_))
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(
            &self.inner.lock().state,
            EditState::Open(OpenDraft {
                phase: DraftPhase::Submitting,
                ..
            })
        )
    }

    /// The open draft, if any.
    #[must_use]
    pub fn draft(&self) -> Option<ListingDraft> {
        match &self.inner.lock().state {
            EditState::Open(open) => Some(open.draft.clone()),
            EditState::Closed => None,
        }
    }

    /// Error shown in the modal after a rejected submit.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        match &self.inner.lock().state {
            EditState::Open(OpenDraft {
                phase: DraftPhase::Failed(message),
                ..
            }) => Some(message.clone()),
            _ => None,
        }
    }

    /// Confirmation shown in the modal after an accepted submit.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match &self.inner.lock().state {
            EditState::Open(OpenDraft {
                phase: DraftPhase::Accepted(message),
                ..
            }) => Some(message.clone()),
            _ => None,
        }
    }

    fn schedule_close(&self, epoch: u64) {
        let inner: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        let observers = Arc::clone(&self.observers);
        let delay = self.close_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Session dropped while waiting.
            let Some(inner) = inner.upgrade() else {
                return;
            };
            if close_if(&inner, Some(epoch)) {
                debug!("Edit modal auto-closed");
                observers.notify_all(StoreChange::DraftClosed);
            }
        });
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("state", &self.inner.lock().state)
            .field("close_delay", &self.close_delay)
            .finish_non_exhaustive()
    }
}

/// Close the modal if it is open and, when given, still at `epoch`.
fn close_if(inner: &Mutex<Inner>, epoch: Option<u64>) -> bool {
    let mut inner = inner.lock();
    let open = matches!(inner.state, EditState::Open(_));
    if !open || epoch.is_some_and(|expected| expected != inner.epoch) {
        return false;
    }
    inner.state = EditState::Closed;
    inner.epoch += 1;
    true
}
