//! `reqwest`-backed implementation of [`StorefrontApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use cartwheel_core::{CartItemId, OrderId, OrderStatus, ProductId};

use super::cache::{CacheKey, CacheValue};
use super::types::{
    Address, AuthResponse, AuthResponseWire, Cart, CartWire, CreateOrderRequest, NewAddress,
    NewReview, Order, Product, ProductListWire, ProductPage, ProductQuery, Registration,
};
use super::{ApiError, StorefrontApi};
use crate::config::ClientConfig;
use crate::session;
use crate::storage::KeyValueStore;

/// Longest body excerpt written to the logs.
const LOG_BODY_CHARS: usize = 500;

// =============================================================================
// HttpClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Reads the bearer credential from storage on every request, so a login or
/// logout through any handle sharing the same storage takes effect at once.
/// Product detail and unfiltered product pages are cached when a TTL is set.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

struct HttpClientInner {
    client: reqwest::Client,
    base_url: Url,
    storage: Arc<dyn KeyValueStore>,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("cache", &self.inner.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("cartwheel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = config.product_cache_ttl.map(|ttl: Duration| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(HttpClientInner {
                client,
                base_url: config.api_url.clone(),
                storage,
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a request for `path`, attaching the stored credential if any.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let builder = self
            .inner
            .client
            .request(method, url)
            .header("Accept", "application/json");

        Ok(match session::stored_token(self.inner.storage.as_ref()) {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let detail = extract_detail(&body);

        if status == StatusCode::UNAUTHORIZED {
            debug!(status = %status, "Storefront API rejected credential");
            return Err(ApiError::Unauthorized { detail });
        }

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %excerpt(&body),
                "Storefront API returned server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                detail = detail.as_deref().unwrap_or(""),
                "Storefront API rejected request"
            );
        }

        Err(ApiError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    /// Send a request and deserialize the JSON body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        parse(&body)
    }

    /// Send a request whose response body is not needed.
    async fn send(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let body = self.execute(request).await?;
        if !body.trim().is_empty() {
            parse::<IgnoredAny>(&body)?;
        }
        Ok(())
    }

    async fn cache_get(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.inner.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn cache_insert(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }

    async fn cache_invalidate(&self, key: &CacheKey) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate(key).await;
        }
    }
}

// =============================================================================
// StorefrontApi Implementation
// =============================================================================

#[async_trait]
impl StorefrontApi for HttpClient {
    #[instrument(skip(self, password), fields(username = %username))]
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let request = self.request(Method::POST, "auth/login/")?.json(&json!({
            "username": username,
            "password": password.expose_secret(),
        }));
        let wire: AuthResponseWire = self.fetch(request).await?;
        Ok(wire.into())
    }

    #[instrument(skip(self, registration), fields(username = %registration.username))]
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        let request = self.request(Method::POST, "auth/register/")?.json(&json!({
            "username": registration.username,
            "email": registration.email,
            "password": registration.password.expose_secret(),
            "first_name": registration.name,
        }));
        let wire: AuthResponseWire = self.fetch(request).await?;
        Ok(wire.into())
    }

    #[instrument(skip(self), fields(page = query.page, keyword = ?query.search_term()))]
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let search = query.search_term();
        let cache_key = CacheKey::Products {
            page: query.page,
            page_size: query.page_size,
        };

        // Only unfiltered listings are cached
        if search.is_none()
            && let Some(CacheValue::Products(page)) = self.cache_get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let mut params = vec![
            ("page", query.page.to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        if let Some(keyword) = search {
            params.push(("keyword", keyword.to_string()));
        }

        let request = self.request(Method::GET, "products/")?.query(&params);
        let wire: ProductListWire = self.fetch(request).await?;
        let page = ProductPage::from_wire(wire, query);

        if search.is_none() {
            self.cache_insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cache_get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let request = self.request(Method::GET, &format!("products/{id}/"))?;
        let product: Product = self.fetch(request).await?;

        self.cache_insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self, review), fields(product_id = %id, rating = %review.rating))]
    async fn submit_review(&self, id: ProductId, review: &NewReview) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, &format!("products/{id}/reviews/"))?
            .json(review);
        self.send(request).await?;

        // Rating and review count changed for this product
        self.cache_invalidate(&CacheKey::Product(id)).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        let request = self.request(Method::GET, "cart/")?;
        let wire: CartWire = self.fetch(request).await?;
        Ok(wire.into())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn add_cart_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        let request = self.request(Method::POST, "cart/add/")?.json(&json!({
            "product_id": product_id,
            "quantity": quantity,
        }));
        self.send(request).await
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    async fn update_cart_item(&self, item_id: CartItemId, quantity: u32) -> Result<(), ApiError> {
        let request = self.request(Method::POST, "cart/update/")?.json(&json!({
            "item_id": item_id,
            "quantity": quantity,
        }));
        self.send(request).await
    }

    #[instrument(skip(self), fields(item_id = %item_id))]
    async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "cart/remove/")?
            .json(&json!({ "item_id": item_id }));
        self.send(request).await
    }

    #[instrument(skip(self, address), fields(address_id = %address.id))]
    async fn create_order(&self, address: &Address) -> Result<Order, ApiError> {
        let request = self
            .request(Method::POST, "orders/create/")?
            .json(&CreateOrderRequest::from(address));
        self.fetch(request).await
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let request = self.request(Method::GET, "orders/")?;
        let wire: ListWire<Order> = self.fetch(request).await?;
        Ok(wire.into_vec())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        let request = self.request(Method::GET, &format!("orders/{id}/"))?;
        self.fetch(request).await
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let request = self
            .request(Method::PATCH, &format!("orders/{id}/status/"))?
            .json(&json!({ "status": status }));
        self.fetch(request).await
    }

    #[instrument(skip(self))]
    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let request = self.request(Method::GET, "orders/addresses/")?;
        let wire: ListWire<Address> = self.fetch(request).await?;
        Ok(wire.into_vec())
    }

    #[instrument(skip(self, address), fields(city = %address.city))]
    async fn create_address(&self, address: &NewAddress) -> Result<Address, ApiError> {
        let request = self
            .request(Method::POST, "orders/addresses/")?
            .json(address);
        self.fetch(request).await
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// A collection returned either bare or inside a paginated envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListWire<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListWire<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Paginated { results } | Self::Plain(results) => results,
        }
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %excerpt(body),
            "Failed to parse storefront API response"
        );
        ApiError::Parse(e)
    })
}

fn excerpt(body: &str) -> String {
    body.chars().take(LOG_BODY_CHARS).collect()
}

/// Pull a human-readable message out of an error body.
///
/// Looks for `detail`, `error` or `message`, then for the first field error
/// of a validation response (`{"field": ["message"]}`).
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["detail", "error", "message"] {
        if let Some(text) = object.get(key).and_then(serde_json::Value::as_str) {
            return Some(text.to_string());
        }
    }

    object.iter().find_map(|(field, value)| {
        let first = match value {
            serde_json::Value::Array(messages) => messages.first()?.as_str()?,
            serde_json::Value::String(message) => message.as_str(),
            _ => return None,
        };
        Some(if field == "non_field_errors" {
            first.to_string()
        } else {
            format!("{field}: {first}")
        })
    })
}
