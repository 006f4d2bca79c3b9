//! Cart slice: a read-through copy of the server cart.

use cartwheel_core::{CartItemId, Price, ProductId};

use crate::api::{Cart, CartItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub loading: bool,
    pub error: Option<String>,
    pub items: Vec<CartItem>,
}

impl CartState {
    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of price × quantity across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn find(&self, item_id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    #[must_use]
    pub fn find_by_product(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn reduce(&mut self, action: CartAction) {
        match action {
            CartAction::Request => {
                self.loading = true;
                self.error = None;
            }
            CartAction::Loaded(cart) => {
                self.loading = false;
                self.error = None;
                self.items = cart.items;
            }
            // Items stay as they were
            CartAction::Failed(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            CartAction::Cleared => *self = Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    Request,
    Loaded(Cart),
    Failed(String),
    Cleared,
}
