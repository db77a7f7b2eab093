//! Observer that records every change.

use parking_lot::Mutex;

use crate::port::{StoreChange, StoreObserver};

#[derive(Debug, Default)]
pub struct RecordingObserver {
    changes: Mutex<Vec<StoreChange>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<StoreChange> {
        self.changes.lock().clone()
    }

    pub fn contains(&self, change: &StoreChange) -> bool {
        self.changes.lock().contains(change)
    }

    pub fn clear(&self) {
        self.changes.lock().clear();
    }
}

impl StoreObserver for RecordingObserver {
    fn on_change(&self, change: &StoreChange) {
        self.changes.lock().push(change.clone());
    }
}
