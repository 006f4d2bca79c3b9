//! Cartwheel storefront client library.
//!
//! Talks to a storefront REST API and keeps client-side state consistent
//! with it: a store of state slices updated by pure reducers, a persisted
//! session and wishlist, and a server-owned cart that is refetched after
//! every change.
//!
//! # Example
//!
//! ```rust,ignore
//! use cartwheel_storefront::{ClientConfig, Dispatcher};
//!
//! let dispatcher = Dispatcher::from_config(&ClientConfig::from_env()?)?;
//! dispatcher.fetch_cart().await;
//! println!("{} items", dispatcher.state().cart.item_count());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod quantity;
pub mod session;
pub mod storage;
pub mod store;
pub mod wishlist;

pub use actions::Dispatcher;
pub use config::ClientConfig;
pub use error::{ClientError, Outcome};
