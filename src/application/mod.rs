//! Application services (use cases).
//!
//! Stateful stores behind the profile page. They coordinate the
//! marketplace API, the session, and the confirmation gate, and publish
//! every state transition to the shared observer registry.

pub mod dashboard;
pub mod edit;
pub mod listings;
pub mod profile;
pub mod roster;
pub mod tabs;

pub use dashboard::Dashboard;
pub use edit::{DraftPhase, EditSession, EditState, OpenDraft};
pub use listings::{ListingCollection, Outcome, Reconciled, Updated};
pub use profile::ProfileStore;
pub use roster::{BuyerRoster, RosterEntry, NO_BUYERS};
pub use tabs::TabController;
