//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the remote marketplace API, the session that
//! authenticates it, the confirmation prompt, and view subscribers.

pub mod confirm;
pub mod marketplace;
pub mod observer;
pub mod session;
