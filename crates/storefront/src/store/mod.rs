//! Client-side application state.
//!
//! State is split into slices ([`AuthState`], [`CartState`],
//! [`ProductsState`], [`OrdersState`]). Each slice changes only by reducing an
//! [`Action`]; reducers are synchronous and never perform I/O. The [`Store`]
//! publishes every new snapshot on a `tokio::sync::watch` channel so views
//! can re-render when state changes.

mod auth;
mod cart;
mod orders;
mod products;

pub use auth::{AuthAction, AuthState};
pub use cart::{CartAction, CartState};
pub use orders::{CheckoutStep, OrdersAction, OrdersState};
pub use products::{ProductDetailState, ProductsAction, ProductsState, ReviewState};

use tokio::sync::watch;

/// Snapshot of all client state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub auth: AuthState,
    pub cart: CartState,
    pub products: ProductsState,
    pub orders: OrdersState,
}

/// Any state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Auth(AuthAction),
    Cart(CartAction),
    Products(ProductsAction),
    Orders(OrdersAction),
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Self::Auth(action)
    }
}

impl From<CartAction> for Action {
    fn from(action: CartAction) -> Self {
        Self::Cart(action)
    }
}

impl From<ProductsAction> for Action {
    fn from(action: ProductsAction) -> Self {
        Self::Products(action)
    }
}

impl From<OrdersAction> for Action {
    fn from(action: OrdersAction) -> Self {
        Self::Orders(action)
    }
}

/// Apply `action` to `state`.
///
/// Logging out also empties the cart and the per-user order data, since an
/// anonymous visitor has neither.
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::Auth(AuthAction::LoggedOut) => {
            state.auth.reduce(AuthAction::LoggedOut);
            state.cart.reduce(CartAction::Cleared);
            state.orders = OrdersState::default();
        }
        Action::Auth(action) => state.auth.reduce(action),
        Action::Cart(action) => state.cart.reduce(action),
        Action::Products(action) => state.products.reduce(action),
        Action::Orders(action) => state.orders.reduce(action),
    }
}

/// Holder of the current [`AppState`].
#[derive(Debug)]
pub struct Store {
    state: watch::Sender<AppState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl Store {
    #[must_use]
    pub fn new(initial: AppState) -> Self {
        Self {
            state: watch::Sender::new(initial),
        }
    }

    /// Reduce `action` and notify subscribers.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        tracing::trace!(?action, "dispatch");
        self.state.send_modify(|state| reduce(state, action));
    }

    /// Clone of the current state.
    #[must_use]
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Receiver that observes every future state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }
}
