//! In-memory storefront for tests.
//!
//! [`MockApi`] behaves like the real REST API closely enough to drive the
//! dispatchers: it issues credentials, checks the stored credential on
//! protected calls, keeps a server-side cart and turns it into orders. Every
//! call is recorded so tests can assert on network traffic, and failures can
//! be injected per endpoint.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use cartwheel_core::{
    AddressId, CartItemId, OrderId, OrderStatus, Price, ProductId, Rating, ReviewId, UserId,
};

use super::types::{
    Address, AuthResponse, Cart, CartItem, NewAddress, NewReview, Order, OrderItem, Product,
    ProductPage, ProductQuery, ProductSnapshot, Profile, Registration, Review,
};
use super::{ApiError, StorefrontApi};
use crate::session;
use crate::storage::KeyValueStore;

/// A recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login { username: String },
    Register { username: String },
    ListProducts(ProductQuery),
    GetProduct(ProductId),
    SubmitReview(ProductId),
    GetCart,
    AddCartItem { product_id: ProductId, quantity: u32 },
    UpdateCartItem { item_id: CartItemId, quantity: u32 },
    RemoveCartItem(CartItemId),
    CreateOrder(AddressId),
    ListOrders,
    GetOrder(OrderId),
    UpdateOrderStatus(OrderId, OrderStatus),
    ListAddresses,
    CreateAddress,
}

/// Endpoint a call targets, for counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Register,
    ListProducts,
    GetProduct,
    SubmitReview,
    GetCart,
    AddCartItem,
    UpdateCartItem,
    RemoveCartItem,
    CreateOrder,
    ListOrders,
    GetOrder,
    UpdateOrderStatus,
    ListAddresses,
    CreateAddress,
}

impl Call {
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::Login { .. } => Endpoint::Login,
            Self::Register { .. } => Endpoint::Register,
            Self::ListProducts(_) => Endpoint::ListProducts,
            Self::GetProduct(_) => Endpoint::GetProduct,
            Self::SubmitReview(_) => Endpoint::SubmitReview,
            Self::GetCart => Endpoint::GetCart,
            Self::AddCartItem { .. } => Endpoint::AddCartItem,
            Self::UpdateCartItem { .. } => Endpoint::UpdateCartItem,
            Self::RemoveCartItem(_) => Endpoint::RemoveCartItem,
            Self::CreateOrder(_) => Endpoint::CreateOrder,
            Self::ListOrders => Endpoint::ListOrders,
            Self::GetOrder(_) => Endpoint::GetOrder,
            Self::UpdateOrderStatus(..) => Endpoint::UpdateOrderStatus,
            Self::ListAddresses => Endpoint::ListAddresses,
            Self::CreateAddress => Endpoint::CreateAddress,
        }
    }
}

/// A failure to return from the next call to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    Unauthorized,
    Api { status: u16, detail: Option<String> },
}

impl MockFailure {
    /// A 400 response with a `detail` message.
    #[must_use]
    pub fn bad_request(detail: &str) -> Self {
        Self::Api {
            status: 400,
            detail: Some(detail.to_string()),
        }
    }

    fn into_error(self) -> ApiError {
        match self {
            Self::Unauthorized => ApiError::Unauthorized { detail: None },
            Self::Api { status, detail } => ApiError::Api { status, detail },
        }
    }
}

struct MockUser {
    password: String,
    profile: Profile,
}

#[derive(Default)]
struct MockState {
    users: HashMap<String, MockUser>,
    tokens: HashMap<String, UserId>,
    products: BTreeMap<ProductId, Product>,
    cart: Vec<CartItem>,
    orders: Vec<Order>,
    addresses: Vec<Address>,
    next_id: i64,
    calls: Vec<Call>,
    failures: HashMap<Endpoint, VecDeque<MockFailure>>,
}

impl MockState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue(&mut self, profile: Profile) -> AuthResponse {
        let token = format!("mock-token-{}", profile.id);
        self.tokens.insert(token.clone(), profile.id);
        AuthResponse {
            access: SecretString::from(token),
            profile,
        }
    }
}

/// Fake storefront API backed by in-memory state.
pub struct MockApi {
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<MockState>,
}

impl std::fmt::Debug for MockApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockApi").finish_non_exhaustive()
    }
}

/// Build a catalog product.
#[must_use]
pub fn product(id: i64, name: &str, price_cents: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: String::new(),
        price: Price::from_cents(price_cents),
        stock,
        rating: Decimal::ZERO,
        review_count: 0,
        image: None,
        image_url: None,
        category: None,
        reviews: Vec::new(),
    }
}

fn snapshot(product: &Product) -> ProductSnapshot {
    ProductSnapshot {
        id: product.id,
        name: product.name.clone(),
        price: product.price,
        stock: product.stock,
        image: product.image.clone(),
        image_url: product.image_url.clone(),
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Api {
        status: 404,
        detail: Some(format!("{what} not found")),
    }
}

fn bad_request(detail: &str) -> ApiError {
    ApiError::Api {
        status: 400,
        detail: Some(detail.to_string()),
    }
}

impl MockApi {
    /// Create an empty storefront that authenticates from `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: Mutex::new(MockState {
                next_id: 100,
                ..MockState::default()
            }),
        }
    }

    /// Add a catalog product.
    #[must_use]
    pub fn with_product(self, product: Product) -> Self {
        self.state.lock().products.insert(product.id, product);
        self
    }

    /// Register a user that can log in with `password`.
    #[must_use]
    pub fn with_user(self, username: &str, password: &str) -> Self {
        {
            let mut state = self.state.lock();
            let id = UserId::new(state.next_id());
            state.users.insert(
                username.to_string(),
                MockUser {
                    password: password.to_string(),
                    profile: Profile {
                        id,
                        username: username.to_string(),
                        name: username.to_string(),
                        email: format!("{username}@example.com"),
                        is_admin: false,
                    },
                },
            );
        }
        self
    }

    /// Add a saved address.
    #[must_use]
    pub fn with_address(self, address: &NewAddress) -> Self {
        {
            let mut state = self.state.lock();
            let id = AddressId::new(state.next_id());
            state.addresses.push(address_from(id, address));
        }
        self
    }

    /// Make the next call to `endpoint` fail.
    pub fn fail_next(&self, endpoint: Endpoint, failure: MockFailure) {
        self.state
            .lock()
            .failures
            .entry(endpoint)
            .or_default()
            .push_back(failure);
    }

    /// Invalidate every issued credential, as if they expired.
    pub fn revoke_tokens(&self) {
        self.state.lock().tokens.clear();
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Number of calls made to `endpoint`.
    #[must_use]
    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Current server-side cart.
    #[must_use]
    pub fn server_cart(&self) -> Vec<CartItem> {
        self.state.lock().cart.clone()
    }

    /// Current server-side stock for a product.
    #[must_use]
    pub fn stock(&self, id: ProductId) -> Option<u32> {
        self.state.lock().products.get(&id).map(|p| p.stock)
    }

    /// Record `call` and return any injected failure for it.
    fn begin(&self, call: Call) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        let endpoint = call.endpoint();
        state.calls.push(call);
        match state.failures.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    /// Like `begin`, then require a valid stored credential.
    fn begin_authenticated(&self, call: Call) -> Result<(), ApiError> {
        self.begin(call)?;
        let token = session::stored_token(self.storage.as_ref());
        let valid = token.is_some_and(|t| self.state.lock().tokens.contains_key(t.expose()));
        if valid {
            Ok(())
        } else {
            Err(ApiError::Unauthorized {
                detail: Some("Authentication credentials were not provided.".to_string()),
            })
        }
    }
}

fn address_from(id: AddressId, address: &NewAddress) -> Address {
    Address {
        id,
        street: address.street.clone(),
        city: address.city.clone(),
        postal_code: address.postal_code.clone(),
        country: address.country.clone(),
        is_default: address.is_default,
    }
}

#[async_trait]
impl StorefrontApi for MockApi {
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        self.begin(Call::Login {
            username: username.to_string(),
        })?;
        let mut state = self.state.lock();
        let profile = state
            .users
            .get(username)
            .filter(|u| u.password == password.expose_secret())
            .map(|u| u.profile.clone())
            .ok_or_else(|| ApiError::Unauthorized {
                detail: Some("No active account found with the given credentials".to_string()),
            })?;
        Ok(state.issue(profile))
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.begin(Call::Register {
            username: registration.username.clone(),
        })?;
        let mut state = self.state.lock();
        if state.users.contains_key(&registration.username) {
            return Err(bad_request(
                "username: A user with that username already exists.",
            ));
        }
        let profile = Profile {
            id: UserId::new(state.next_id()),
            username: registration.username.clone(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            is_admin: false,
        };
        state.users.insert(
            registration.username.clone(),
            MockUser {
                password: registration.password.expose_secret().to_string(),
                profile: profile.clone(),
            },
        );
        Ok(state.issue(profile))
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        self.begin(Call::ListProducts(query.clone()))?;
        let state = self.state.lock();
        let keyword = query.search_term().map(str::to_lowercase);
        let matching: Vec<&Product> = state
            .products
            .values()
            .filter(|p| {
                keyword
                    .as_deref()
                    .is_none_or(|k| p.name.to_lowercase().contains(k))
            })
            .collect();

        let page_size = query.page_size.max(1);
        let page = query.page.max(1);
        let skip = usize::try_from((page - 1) * page_size).unwrap_or(usize::MAX);
        let take = usize::try_from(page_size).unwrap_or(usize::MAX);
        let count = u32::try_from(matching.len()).unwrap_or(u32::MAX);

        Ok(ProductPage {
            items: matching.into_iter().skip(skip).take(take).cloned().collect(),
            count,
            page,
            page_size,
            total_pages: count.div_ceil(page_size).max(1),
        })
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.begin(Call::GetProduct(id))?;
        self.state
            .lock()
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("Product"))
    }

    async fn submit_review(&self, id: ProductId, review: &NewReview) -> Result<(), ApiError> {
        self.begin_authenticated(Call::SubmitReview(id))?;
        let mut state = self.state.lock();
        let review_id = ReviewId::new(state.next_id());
        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| not_found("Product"))?;

        product.reviews.push(Review {
            id: Some(review_id),
            author: "reviewer".to_string(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: None,
        });
        product.review_count = u32::try_from(product.reviews.len()).unwrap_or(u32::MAX);
        let total: Decimal = product
            .reviews
            .iter()
            .map(|r| Decimal::from(r.rating.stars()))
            .sum();
        product.rating = total / Decimal::from(product.review_count);
        Ok(())
    }

    async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.begin_authenticated(Call::GetCart)?;
        Ok(Cart {
            items: self.state.lock().cart.clone(),
        })
    }

    async fn add_cart_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.begin_authenticated(Call::AddCartItem {
            product_id,
            quantity,
        })?;
        let mut state = self.state.lock();
        let product = state
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| not_found("Product"))?;

        let existing = state
            .cart
            .iter()
            .find(|i| i.product.id == product_id)
            .map_or(0, |i| i.quantity);
        if existing + quantity > product.stock {
            return Err(bad_request(&format!(
                "Only {} left in stock",
                product.stock
            )));
        }

        if let Some(item) = state.cart.iter_mut().find(|i| i.product.id == product_id) {
            item.quantity += quantity;
        } else {
            let id = CartItemId::new(state.next_id());
            state.cart.push(CartItem {
                id,
                product: snapshot(&product),
                quantity,
            });
        }
        Ok(())
    }

    async fn update_cart_item(&self, item_id: CartItemId, quantity: u32) -> Result<(), ApiError> {
        self.begin_authenticated(Call::UpdateCartItem { item_id, quantity })?;
        let mut state = self.state.lock();
        if quantity == 0 {
            let before = state.cart.len();
            state.cart.retain(|i| i.id != item_id);
            return if state.cart.len() == before {
                Err(not_found("Cart item"))
            } else {
                Ok(())
            };
        }

        let item = state
            .cart
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| not_found("Cart item"))?;
        if quantity > item.product.stock {
            return Err(bad_request("Not enough stock"));
        }
        item.quantity = quantity;
        Ok(())
    }

    async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        self.begin_authenticated(Call::RemoveCartItem(item_id))?;
        let mut state = self.state.lock();
        let before = state.cart.len();
        state.cart.retain(|i| i.id != item_id);
        if state.cart.len() == before {
            return Err(not_found("Cart item"));
        }
        Ok(())
    }

    async fn create_order(&self, address: &Address) -> Result<Order, ApiError> {
        self.begin_authenticated(Call::CreateOrder(address.id))?;
        let mut state = self.state.lock();
        if state.cart.is_empty() {
            return Err(bad_request("Cart is empty"));
        }

        let items: Vec<OrderItem> = state
            .cart
            .drain(..)
            .map(|item| OrderItem {
                unit_price: item.product.price,
                product: item.product,
                quantity: item.quantity,
            })
            .collect();

        for item in &items {
            if let Some(product) = state.products.get_mut(&item.product.id) {
                product.stock = product.stock.saturating_sub(item.quantity);
            }
        }

        let order = Order {
            id: OrderId::new(state.next_id()),
            created_at: None,
            status: OrderStatus::Pending,
            shipping: address.shipping(),
            total_price: items.iter().map(|i| i.unit_price.times(i.quantity)).sum(),
            items,
        };
        state.orders.insert(0, order.clone());
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.begin_authenticated(Call::ListOrders)?;
        Ok(self.state.lock().orders.clone())
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.begin_authenticated(Call::GetOrder(id))?;
        self.state
            .lock()
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| not_found("Order"))
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.begin_authenticated(Call::UpdateOrderStatus(id, status))?;
        let mut state = self.state.lock();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| not_found("Order"))?;
        order.status = status;
        Ok(order.clone())
    }

    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.begin_authenticated(Call::ListAddresses)?;
        Ok(self.state.lock().addresses.clone())
    }

    async fn create_address(&self, address: &NewAddress) -> Result<Address, ApiError> {
        self.begin_authenticated(Call::CreateAddress)?;
        let mut state = self.state.lock();
        let id = AddressId::new(state.next_id());
        if address.is_default {
            for existing in &mut state.addresses {
                existing.is_default = false;
            }
        }
        let created = address_from(id, address);
        state.addresses.push(created.clone());
        Ok(created)
    }
}

/// A rating for tests; panics outside 1–5.
#[must_use]
#[allow(clippy::expect_used)]
pub fn rating(stars: i64) -> Rating {
    Rating::new(stars).expect("rating must be between 1 and 5")
}
