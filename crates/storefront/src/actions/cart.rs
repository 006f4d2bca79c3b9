//! Cart synchronization.
//!
//! The server owns the cart. Every successful mutation is followed by
//! exactly one full refetch; the client never merges changes locally.

use tracing::instrument;

use cartwheel_core::{CartItemId, ProductId};

use super::Dispatcher;
use crate::api::{ApiError, Cart};
use crate::error::Outcome;
use crate::quantity::{Change, QuantityControl};
use crate::store::CartAction;

impl Dispatcher {
    /// Refresh the cart from the server.
    ///
    /// Without a credential the cart is empty and no request is made. A
    /// server-side "not authenticated" signs the user out and also yields an
    /// empty cart.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Outcome<Cart> {
        if !self.has_credential() {
            self.store.dispatch(CartAction::Loaded(Cart::empty()));
            return Outcome::Ok(Cart::empty());
        }

        self.store.dispatch(CartAction::Request);
        match self.api.get_cart().await {
            Ok(cart) => {
                self.store.dispatch(CartAction::Loaded(cart.clone()));
                Outcome::Ok(cart)
            }
            Err(e) if e.is_unauthorized() => {
                self.expire_session();
                Outcome::Ok(Cart::empty())
            }
            Err(e) => {
                let message = e.user_message();
                self.store.dispatch(CartAction::Failed(message.clone()));
                Outcome::Error(message)
            }
        }
    }

    /// Add `quantity` units of a product.
    ///
    /// The quantity is clamped to the stock the client knows about, minus
    /// what is already in the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Outcome<()> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        let quantity = match self.available_stock(product_id) {
            Some(0) => return self.cart_error("This product is out of stock"),
            Some(available) => quantity.min(available),
            None => quantity,
        };
        if quantity == 0 {
            return self.cart_error("Quantity must be at least 1");
        }

        let result = self.api.add_cart_item(product_id, quantity).await;
        self.after_mutation(result).await
    }

    /// Set a line's quantity. Zero removes the line.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_item(&self, item_id: CartItemId, quantity: u32) -> Outcome<()> {
        if quantity == 0 {
            return self.remove_item(item_id).await;
        }
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        let result = self.api.update_cart_item(item_id, quantity).await;
        self.after_mutation(result).await
    }

    /// Like `update_item`, clamping `quantity` to the line's stock first.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn set_quantity(&self, item_id: CartItemId, quantity: u32) -> Outcome<()> {
        let control = self.store.with(|s| {
            s.cart
                .find(item_id)
                .map(|item| QuantityControl::new(item.quantity, item.product.stock, true))
        });

        let quantity = match control {
            Some(mut control) => {
                control.apply(quantity);
                if control.value() < quantity {
                    tracing::debug!(
                        requested = quantity,
                        stock = control.max(),
                        "Clamped quantity to stock"
                    );
                }
                control.value()
            }
            None => quantity,
        };

        self.update_item(item_id, quantity).await
    }

    /// Press + on a cart line.
    pub async fn increment(&self, item_id: CartItemId) -> Outcome<Change> {
        self.step(item_id, QuantityControl::increment).await
    }

    /// Press - on a cart line; at one this removes the line.
    pub async fn decrement(&self, item_id: CartItemId) -> Outcome<Change> {
        self.step(item_id, QuantityControl::decrement).await
    }

    /// Remove a cart line.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: CartItemId) -> Outcome<()> {
        if !self.has_credential() {
            return Outcome::AuthRequired;
        }

        let result = self.api.remove_cart_item(item_id).await;
        self.after_mutation(result).await
    }

    async fn step(
        &self,
        item_id: CartItemId,
        press: impl FnOnce(&mut QuantityControl) -> Change,
    ) -> Outcome<Change> {
        let Some(mut control) = self.store.with(|s| {
            s.cart
                .find(item_id)
                .map(|item| QuantityControl::new(item.quantity, item.product.stock, true))
        }) else {
            return self.cart_error("That item is no longer in your cart");
        };

        let change = press(&mut control);
        let sent = match change {
            Change::Set(quantity) => self.update_item(item_id, quantity).await,
            Change::Remove => self.remove_item(item_id).await,
            Change::AtLimit | Change::Disabled => Outcome::Ok(()),
        };
        sent.map(|()| change)
    }

    /// Refetch after a successful mutation; report a failed one.
    async fn after_mutation(&self, result: Result<(), ApiError>) -> Outcome<()> {
        match result {
            Ok(()) => self.fetch_cart().await.map(|_| ()),
            Err(e) if e.is_unauthorized() => {
                self.expire_session();
                Outcome::AuthRequired
            }
            Err(e) => {
                let message = e.user_message();
                self.store.dispatch(CartAction::Failed(message.clone()));
                Outcome::Error(message)
            }
        }
    }

    fn cart_error<T>(&self, message: &str) -> Outcome<T> {
        self.store.dispatch(CartAction::Failed(message.to_string()));
        Outcome::Error(message.to_string())
    }

    /// Units of a product that can still be added, if its stock is known.
    fn available_stock(&self, product_id: ProductId) -> Option<u32> {
        self.store.with(|s| {
            let in_cart = s.cart.find_by_product(product_id);
            let stock = in_cart.map(|item| item.product.stock).or_else(|| {
                s.products
                    .detail
                    .product
                    .iter()
                    .chain(s.products.items.iter())
                    .find(|p| p.id == product_id)
                    .map(|p| p.stock)
            })?;
            Some(stock.saturating_sub(in_cart.map_or(0, |item| item.quantity)))
        })
    }
}
