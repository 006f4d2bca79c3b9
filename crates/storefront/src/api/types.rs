//! Domain types for the storefront REST API.
//!
//! These types mirror the JSON the API returns, with field renames where the
//! wire names differ from the domain vocabulary (e.g. `address` → `street`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use cartwheel_core::{
    AddressId, CartItemId, CategoryId, OrderId, OrderStatus, Price, ProductId, Rating, ReviewId,
    UserId,
};

// =============================================================================
// Account Types
// =============================================================================

/// Profile of the signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// User ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address (may be empty).
    #[serde(default)]
    pub email: String,
    /// Whether the user may perform administrative actions.
    #[serde(default)]
    pub is_admin: bool,
}

impl Profile {
    /// Display name, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// Successful login or registration: credential plus profile.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    /// Bearer credential for later requests.
    pub access: SecretString,
    /// The authenticated user's profile.
    pub profile: Profile,
}

/// Wire shape of a login/registration response.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponseWire {
    pub access: String,
    #[serde(flatten)]
    pub profile: Profile,
}

impl From<AuthResponseWire> for AuthResponse {
    fn from(wire: AuthResponseWire) -> Self {
        Self {
            access: SecretString::from(wire.access),
            profile: wire.profile,
        }
    }
}

/// New account details.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password (never logged).
    pub password: SecretString,
    /// Display name.
    pub name: String,
}

// =============================================================================
// Product Types
// =============================================================================

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// A customer review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review ID (absent on some list payloads).
    #[serde(default)]
    pub id: Option<ReviewId>,
    /// Author display name.
    #[serde(rename = "name")]
    pub author: String,
    /// Star rating.
    pub rating: Rating,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
    /// Creation timestamp.
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A review about to be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub rating: Rating,
    pub comment: String,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// Current price.
    pub price: Price,
    /// Units available for sale.
    #[serde(default)]
    pub stock: u32,
    /// Average review rating.
    #[serde(default)]
    pub rating: Decimal,
    /// Number of reviews.
    #[serde(default, rename = "numReviews")]
    pub review_count: u32,
    /// Relative image path.
    #[serde(default)]
    pub image: Option<String>,
    /// Absolute image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Category, when assigned.
    #[serde(default)]
    pub category: Option<Category>,
    /// Reviews, oldest first.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Best available image reference.
    #[must_use]
    pub fn image_ref(&self) -> Option<&str> {
        self.image_url.as_deref().or(self.image.as_deref())
    }

    /// Whether any unit can be bought.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Denormalized product data embedded in cart and order lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductSnapshot {
    /// Best available image reference.
    #[must_use]
    pub fn image_ref(&self) -> Option<&str> {
        self.image_url.as_deref().or(self.image.as_deref())
    }
}

/// Product listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// 1-based page number.
    pub page: u32,
    /// Products per page.
    pub page_size: u32,
    /// Optional name filter.
    pub keyword: Option<String>,
}

impl ProductQuery {
    /// First page of `page_size` products with no filter.
    #[must_use]
    pub const fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            keyword: None,
        }
    }

    /// The keyword, if it is non-blank.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPage {
    /// Products on this page.
    pub items: Vec<Product>,
    /// Total products matching the query.
    pub count: u32,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Number of pages (at least 1).
    pub total_pages: u32,
}

/// Wire shape of the product listing: paginated envelope or plain list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProductListWire {
    Paginated { count: u32, results: Vec<Product> },
    Plain(Vec<Product>),
}

impl ProductPage {
    pub(crate) fn from_wire(wire: ProductListWire, query: &ProductQuery) -> Self {
        let page = query.page.max(1);
        match wire {
            ProductListWire::Paginated { count, results } => {
                let page_size = query.page_size.max(1);
                Self {
                    items: results,
                    count,
                    page,
                    page_size,
                    total_pages: count.div_ceil(page_size).max(1),
                }
            }
            ProductListWire::Plain(items) => Self {
                count: u32::try_from(items.len()).unwrap_or(u32::MAX),
                items,
                page,
                page_size: query.page_size,
                total_pages: 1,
            },
        }
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line in the server cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartItem {
    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// The server cart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }
}

/// Wire shape of the cart: `{items: [...]}` or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CartWire {
    Envelope {
        #[serde(default)]
        items: Vec<CartItem>,
    },
    Plain(Vec<CartItem>),
}

impl From<CartWire> for Cart {
    fn from(wire: CartWire) -> Self {
        match wire {
            CartWire::Envelope { items } | CartWire::Plain(items) => Self { items },
        }
    }
}

// =============================================================================
// Address Types
// =============================================================================

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(rename = "address")]
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// The address without its ID.
    #[must_use]
    pub fn shipping(&self) -> ShippingAddress {
        ShippingAddress {
            street: self.street.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {} - {}",
            self.street, self.city, self.country, self.postal_code
        )
    }
}

/// Address form contents for creating a saved address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NewAddress {
    #[serde(rename = "address")]
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

impl NewAddress {
    /// Names of required fields left blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("postal code", &self.postal_code),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

// =============================================================================
// Order Types
// =============================================================================

/// Address an order ships to, copied at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(rename = "address", default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// A purchased line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
    /// Unit price at purchase time.
    #[serde(rename = "price")]
    pub unit_price: Price,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(flatten)]
    pub shipping: ShippingAddress,
    pub total_price: Price,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Body of the create-order request.
#[derive(Debug, Serialize)]
pub(crate) struct CreateOrderRequest {
    pub address_id: AddressId,
    #[serde(flatten)]
    pub shipping: ShippingAddress,
}

impl From<&Address> for CreateOrderRequest {
    fn from(address: &Address) -> Self {
        Self {
            address_id: address.id,
            shipping: address.shipping(),
        }
    }
}
