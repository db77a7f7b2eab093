//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (the marketplace API, the session, the terminal).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  HTTP   │            │  Session    │              │ Confirmer │
//! │ Adapter │            │  Adapter    │              │ / Observer│
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`MarketplaceApi`] - Profile and listing endpoints
//! - [`SessionContext`] - Identity and bearer credential
//! - [`Confirmer`] - Yes/no gate before destructive requests
//! - [`StoreObserver`] - Change notifications for view layers

pub mod outbound;

pub use outbound::confirm::{AssumeYes, Confirmer};
pub use outbound::marketplace::{MarketplaceApi, StatusChange};
pub use outbound::observer::{
    LogObserver, NullObserver, ObserverRegistry, StoreChange, StoreObserver,
};
pub use outbound::session::SessionContext;
