//! Cartwheel Core - Shared domain types.
//!
//! This crate provides the types shared by every Cartwheel component:
//! - `storefront` - Client library (API client, store, session, wishlist)
//! - `cli` - Command-line front end for browsing, cart and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, ratings and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
