//! Outbound adapters (driven side).

pub mod marketplace;
pub mod session;
