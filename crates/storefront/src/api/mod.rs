//! Storefront REST API access.
//!
//! # Architecture
//!
//! - [`StorefrontApi`] is the seam between dispatchers and the network
//! - [`HttpClient`] implements it over `reqwest`, attaching the persisted
//!   bearer credential to every request
//! - Product reads are cached in memory via `moka`; cart, orders and
//!   addresses are always fetched fresh
//!
//! # Example
//!
//! ```rust,ignore
//! use cartwheel_storefront::api::{HttpClient, StorefrontApi};
//!
//! let client = HttpClient::new(&config, storage)?;
//! let cart = client.get_cart().await?;
//! ```

mod cache;
mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod types;

pub use http::HttpClient;
pub use types::*;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use cartwheel_core::{AddressId, CartItemId, OrderId, OrderStatus, ProductId};

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the credential (or none was sent).
    #[error("Not authenticated")]
    Unauthorized { detail: Option<String> },

    /// The server answered with a non-success status.
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the server reported the request as not authenticated.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Message suitable for showing to the user.
    ///
    /// Prefers the server-provided detail, falling back to a generic
    /// transport message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                detail: Some(detail),
                ..
            }
            | Self::Unauthorized {
                detail: Some(detail),
            } => detail.clone(),
            Self::Api { status, .. } => format!("Request failed with status code {status}"),
            Self::Unauthorized { detail: None } => "Authentication required".to_string(),
            Self::Http(e) if e.is_timeout() => "The request timed out".to_string(),
            Self::Http(_) => "Network error: the storefront could not be reached".to_string(),
            Self::Parse(_) | Self::InvalidUrl(_) => {
                "Unexpected response from the storefront".to_string()
            }
        }
    }
}

/// Operations the storefront REST API offers.
///
/// Implementations authenticate from the persisted session on their own;
/// callers never pass credentials except to `login`/`register`.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    // Auth

    /// Exchange username and password for a credential and profile.
    async fn login(&self, username: &str, password: &SecretString)
    -> Result<AuthResponse, ApiError>;

    /// Create an account; returns the same payload as `login`.
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError>;

    // Products

    /// List one page of products.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError>;

    /// Fetch a single product with its reviews.
    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError>;

    /// Post a review for a product.
    async fn submit_review(&self, id: ProductId, review: &NewReview) -> Result<(), ApiError>;

    // Cart

    /// Fetch the server cart.
    async fn get_cart(&self) -> Result<Cart, ApiError>;

    /// Add `quantity` units of a product (accumulates on an existing line).
    async fn add_cart_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError>;

    /// Set a cart line's quantity.
    async fn update_cart_item(&self, item_id: CartItemId, quantity: u32) -> Result<(), ApiError>;

    /// Remove a cart line.
    async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), ApiError>;

    // Orders

    /// Place an order for the current server cart, shipped to `address`.
    async fn create_order(&self, address: &Address) -> Result<Order, ApiError>;

    /// List the user's orders.
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// Fetch one order.
    async fn get_order(&self, id: OrderId) -> Result<Order, ApiError>;

    /// Change an order's status.
    async fn update_order_status(&self, id: OrderId, status: OrderStatus)
    -> Result<Order, ApiError>;

    // Addresses

    /// List saved addresses.
    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError>;

    /// Save a new address.
    async fn create_address(&self, address: &NewAddress) -> Result<Address, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ApiError::Api {
            status: 400,
            detail: Some("Insufficient stock".to_string()),
        };
        assert_eq!(err.user_message(), "Insufficient stock");
    }

    #[test]
    fn test_user_message_fallback() {
        let err = ApiError::Api {
            status: 500,
            detail: None,
        };
        assert_eq!(err.user_message(), "Request failed with status code 500");
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::Unauthorized { detail: None };
        assert!(err.is_unauthorized());
        assert!(
            !ApiError::Api {
                status: 403,
                detail: None
            }
            .is_unauthorized()
        );
    }
}
