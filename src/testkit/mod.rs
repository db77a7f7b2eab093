//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`api`] - `FakeMarketplace`, an in-memory [`MarketplaceApi`](crate::port::MarketplaceApi)
//!   that records every call and can be told to fail the next one.
//! - [`confirm`] - `ScriptedConfirmer` with a fixed answer and a prompt log.
//! - [`observer`] - `RecordingObserver` capturing published changes.
//! - [`session`] - `PendingSession`, an identity that resolves on demand.
//! - [`domain`] - Builders for listings, buyers, and sessions.

pub mod api;
pub mod confirm;
pub mod domain;
pub mod observer;
pub mod session;
