//! REST adapter for the bike marketplace API.

pub mod client;
pub mod dto;

pub use client::HttpMarketplaceApi;
