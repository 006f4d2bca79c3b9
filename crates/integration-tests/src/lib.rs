//! Integration tests for Cartwheel.
//!
//! Each test drives a real [`Dispatcher`] with the HTTP client and file
//! storage against a `wiremock` server standing in for the storefront API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwheel-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session` - Login, registration and persisted sessions
//! - `catalog` - Product listing, detail and reviews
//! - `cart` - Cart synchronization
//! - `checkout` - Address selection and order placement

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

use cartwheel_storefront::storage::{FileStore, KeyValueStore, keys};
use cartwheel_storefront::{ClientConfig, Dispatcher};

/// Token the fake storefront issues.
pub const TOKEN: &str = "test-access-token";

/// A mock storefront plus an isolated state directory.
pub struct TestContext {
    pub server: MockServer,
    pub state_dir: TempDir,
}

impl TestContext {
    /// Start a fresh mock server with an empty state directory.
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            state_dir: TempDir::new().expect("Failed to create state dir"),
        }
    }

    /// Client configuration pointing at the mock server's `/api/` root.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&format!("{}/api/", self.server.uri()))
            .expect("Mock server URI should be valid")
            .with_state_dir(self.state_dir.path())
            .without_product_cache()
    }

    /// A dispatcher built the way the CLI builds one.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::from_config(&self.config()).expect("Failed to build dispatcher")
    }

    /// The on-disk store the dispatcher reads and writes.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(FileStore::new(self.state_dir.path()))
    }

    /// Persist a signed-in session as a previous run would have left it.
    pub fn seed_session(&self) {
        let storage = self.storage();
        storage
            .set(keys::USER_INFO, &profile_json().to_string())
            .expect("Failed to seed profile");
        storage
            .set(keys::ACCESS_TOKEN, TOKEN)
            .expect("Failed to seed token");
    }

    /// Requests the mock server has received for `method` and `path`.
    pub async fn requests_to(&self, method: &str, path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == method && r.url.path() == path)
            .count()
    }

    /// Every request the mock server has received.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// The signed-in user's profile as the API returns it.
#[must_use]
pub fn profile_json() -> Value {
    json!({
        "id": 1,
        "username": "ada",
        "email": "ada@example.com",
        "name": "Ada Lovelace",
        "is_admin": false
    })
}

/// A login or registration response.
#[must_use]
pub fn auth_json() -> Value {
    let mut body = profile_json();
    body["access"] = json!(TOKEN);
    body["refresh"] = json!("test-refresh-token");
    body
}

/// A product with no reviews.
#[must_use]
pub fn product_json(id: i64, name: &str, price: &str, stock: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "price": price,
        "stock": stock,
        "rating": "0.00",
        "numReviews": 0,
        "image": null,
        "reviews": []
    })
}

/// A cart line for `product`.
#[must_use]
pub fn cart_item_json(id: i64, product: &Value, quantity: u32) -> Value {
    json!({
        "id": id,
        "product": product,
        "quantity": quantity
    })
}

/// A saved address.
#[must_use]
pub fn address_json(id: i64, is_default: bool) -> Value {
    json!({
        "id": id,
        "address": format!("{id} Main St"),
        "city": "Springfield",
        "postal_code": "12345",
        "country": "US",
        "is_default": is_default
    })
}

/// A freshly placed order.
#[must_use]
pub fn order_json(id: i64, items: &[Value], total: &str) -> Value {
    json!({
        "id": id,
        "created_at": "2025-03-01T12:00:00Z",
        "status": "PENDING",
        "address": "1 Main St",
        "city": "Springfield",
        "postal_code": "12345",
        "country": "US",
        "total_price": total,
        "items": items
    })
}
