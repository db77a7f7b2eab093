//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! business logic.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading, validation, and logging setup
//! - [`bootstrap`] - Composition root wiring adapters into a dashboard

pub mod bootstrap;
pub mod config;
