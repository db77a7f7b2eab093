//! Marketplace domain types: profiles, listings, buyers, drafts.

mod draft;
mod identity;
mod ids;
mod listing;
mod notice;
mod profile;
mod tab;
mod wire;

pub use draft::{DraftChange, DraftField, ListingDraft};
pub use identity::{Identity, Role};
pub use ids::{ListingId, UserId};
pub use listing::{api_origin, Buyer, Listing};
pub use notice::{Notice, NoticeKind};
pub use profile::{ProfileField, UserProfile};
pub use tab::Tab;
