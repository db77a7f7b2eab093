//! Bikeyard - profile and owned-listing state for a two-wheeler resale
//! marketplace.
//!
//! The crate holds the client-side state behind a seller's profile page:
//! the editable profile, the listings the seller owns, an edit draft for one
//! listing, the buyers interested in each listing, and which dashboard tab
//! is showing. Every mutation goes to the marketplace API and the stores
//! mirror whatever the server returns.
//!
//! # Architecture
//!
//! - **`domain`** - Profiles, listings, buyers, drafts, notices
//! - **`port`** - Traits at the edges: API, session, confirmation, observers
//! - **`application`** - The stores: `ProfileStore`, `ListingCollection`,
//!   `EditSession`, `BuyerRoster`, `TabController`, wired by `Dashboard`
//! - **`adapter`** - `reqwest` API client, environment session, CLI
//! - **`infrastructure`** - Configuration, logging, composition root
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bikeyard::adapter::outbound::session::StaticSession;
//! use bikeyard::infrastructure::bootstrap::build_dashboard;
//! use bikeyard::infrastructure::config::Config;
//! use bikeyard::port::AssumeYes;
//!
//! # async fn demo() -> bikeyard::error::Result<()> {
//! let config = Config::load_or_default("bikeyard.toml")?;
//! let dashboard = build_dashboard(
//!     &config,
//!     Arc::new(StaticSession::from_env()),
//!     Arc::new(AssumeYes),
//! )?;
//! dashboard.listings.load_owned().await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
