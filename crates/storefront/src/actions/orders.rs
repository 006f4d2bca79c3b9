//! Checkout, saved addresses and order history.

use tracing::instrument;

use cartwheel_core::{AddressId, OrderId, OrderStatus};

use super::Dispatcher;
use crate::api::{Address, ApiError, NewAddress, Order};
use crate::error::Outcome;
use crate::store::OrdersAction;

impl Dispatcher {
    /// Start checkout for the cached cart and load the saved addresses.
    #[instrument(skip(self))]
    pub async fn begin_checkout(&self) -> Outcome<()> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }
        if self.store.with(|s| s.cart.is_empty()) {
            let message = "Your cart is empty".to_string();
            self.store
                .dispatch(OrdersAction::CheckoutAborted(message.clone()));
            return Outcome::Error(message);
        }

        self.store.dispatch(OrdersAction::CheckoutStarted);
        self.list_addresses().await.map(|_| ())
    }

    /// Load saved addresses, preselecting the default one.
    #[instrument(skip(self))]
    pub async fn list_addresses(&self) -> Outcome<Vec<Address>> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        self.store.dispatch(OrdersAction::Request);
        match self.api.list_addresses().await {
            Ok(addresses) => {
                self.store
                    .dispatch(OrdersAction::AddressesLoaded(addresses.clone()));
                Outcome::Ok(addresses)
            }
            Err(e) => self.orders_failure(e),
        }
    }

    /// Choose the shipping address for the order.
    pub fn select_address(&self, id: AddressId) -> Outcome<()> {
        self.store.dispatch(OrdersAction::AddressSelected(id));
        if self.store.with(|s| s.orders.selected_address == Some(id)) {
            Outcome::Ok(())
        } else {
            let message = format!("Address {id} is not one of your saved addresses");
            self.store.dispatch(OrdersAction::Failed(message.clone()));
            Outcome::Error(message)
        }
    }

    /// Save a new address and select it.
    #[instrument(skip(self, address), fields(city = %address.city))]
    pub async fn create_address(&self, address: &NewAddress) -> Outcome<Address> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        let missing = address.missing_fields();
        if !missing.is_empty() {
            let message = format!("Please fill in: {}", missing.join(", "));
            self.store.dispatch(OrdersAction::Failed(message.clone()));
            return Outcome::Error(message);
        }

        self.store.dispatch(OrdersAction::Request);
        match self.api.create_address(address).await {
            Ok(created) => {
                self.store
                    .dispatch(OrdersAction::AddressCreated(created.clone()));
                Outcome::Ok(created)
            }
            Err(e) => self.orders_failure(e),
        }
    }

    /// Place an order for the server cart, shipped to the selected address.
    ///
    /// On success the cart is refetched (now empty on the server). On failure
    /// the checkout returns to address selection and the cart is untouched.
    #[instrument(skip(self))]
    pub async fn place_order(&self) -> Outcome<Order> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        let (address, cart_empty) = self
            .store
            .with(|s| (s.orders.selected().cloned(), s.cart.is_empty()));

        let Some(address) = address else {
            return self.checkout_failure("Please select a shipping address");
        };
        if cart_empty {
            return self.checkout_failure("Your cart is empty");
        }

        self.store.dispatch(OrdersAction::OrderSubmitted);
        let order = match self.api.create_order(&address).await {
            Ok(order) => order,
            Err(e) if e.is_unauthorized() => {
                self.expire_session();
                return Outcome::AuthRequired;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Order placement failed");
                return self.checkout_failure(&e.user_message());
            }
        };

        tracing::info!(order_id = %order.id, total = %order.total_price, "Order placed");
        self.store
            .dispatch(OrdersAction::OrderPlaced(Box::new(order.clone())));

        if self.fetch_cart().await.is_ok() {
            self.store.dispatch(OrdersAction::CartRefreshed);
        }
        Outcome::Ok(order)
    }

    /// Clear the "order placed" flag once the confirmation was shown.
    pub fn reset_order_success(&self) {
        self.store.dispatch(OrdersAction::ResetOrderSuccess);
    }

    /// Leave the checkout flow.
    pub fn reset_checkout(&self) {
        self.store.dispatch(OrdersAction::CheckoutReset);
    }

    /// Load the order history.
    #[instrument(skip(self))]
    pub async fn fetch_orders(&self) -> Outcome<Vec<Order>> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        self.store.dispatch(OrdersAction::Request);
        match self.api.list_orders().await {
            Ok(orders) => {
                self.store.dispatch(OrdersAction::ListLoaded(orders.clone()));
                Outcome::Ok(orders)
            }
            Err(e) => self.orders_failure(e),
        }
    }

    /// Load one order for the detail view.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn fetch_order(&self, id: OrderId) -> Outcome<Order> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        self.store.dispatch(OrdersAction::Request);
        match self.api.get_order(id).await {
            Ok(order) => {
                self.store
                    .dispatch(OrdersAction::DetailLoaded(Box::new(order.clone())));
                Outcome::Ok(order)
            }
            Err(e) => self.orders_failure(e),
        }
    }

    /// Change an order's status (administrative).
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Outcome<Order> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        self.store.dispatch(OrdersAction::Request);
        match self.api.update_order_status(id, status).await {
            Ok(order) => {
                self.store
                    .dispatch(OrdersAction::StatusUpdated(Box::new(order.clone())));
                Outcome::Ok(order)
            }
            Err(e) => self.orders_failure(e),
        }
    }

    fn orders_failure<T>(&self, err: ApiError) -> Outcome<T> {
        if err.is_unauthorized() {
            self.expire_session();
            return Outcome::AuthRequired;
        }
        let message = err.user_message();
        self.store.dispatch(OrdersAction::Failed(message.clone()));
        Outcome::Error(message)
    }

    fn checkout_failure<T>(&self, message: &str) -> Outcome<T> {
        self.store
            .dispatch(OrdersAction::CheckoutFailed(message.to_string()));
        Outcome::Error(message.to_string())
    }
}
