//! Orders slice: order history, saved addresses and the checkout flow.

use cartwheel_core::{AddressId, OrderId};

use crate::api::{Address, Order};

/// Position in the checkout flow.
///
/// Moves forward only: `Idle → SelectingAddress → Submitting →
/// Confirmed → CartRefreshed`. A failed submission returns to
/// `SelectingAddress`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutStep {
    #[default]
    Idle,
    SelectingAddress,
    Submitting,
    Confirmed(OrderId),
    CartRefreshed(OrderId),
}

impl CheckoutStep {
    /// The placed order, once the server confirmed it.
    #[must_use]
    pub const fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::Confirmed(id) | Self::CartRefreshed(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersState {
    pub loading: bool,
    pub error: Option<String>,
    /// Order history, newest first.
    pub orders: Vec<Order>,
    /// Order shown on the detail/confirmation view.
    pub detail: Option<Order>,
    pub addresses: Vec<Address>,
    pub selected_address: Option<AddressId>,
    pub checkout: CheckoutStep,
    /// Set when an order was just placed; cleared by `ResetOrderSuccess`.
    pub success: bool,
}

impl OrdersState {
    /// The selected address, if it is still among the saved addresses.
    #[must_use]
    pub fn selected(&self) -> Option<&Address> {
        let id = self.selected_address?;
        self.addresses.iter().find(|a| a.id == id)
    }

    fn upsert(&mut self, order: &Order) {
        if let Some(existing) = self.orders.iter_mut().find(|o| o.id == order.id) {
            *existing = order.clone();
        }
        if self.detail.as_ref().is_some_and(|d| d.id == order.id) {
            self.detail = Some(order.clone());
        }
    }

    pub(crate) fn reduce(&mut self, action: OrdersAction) {
        match action {
            OrdersAction::Request => {
                self.loading = true;
                self.error = None;
            }
            OrdersAction::Failed(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            OrdersAction::ListLoaded(orders) => {
                self.loading = false;
                self.error = None;
                self.orders = orders;
            }
            OrdersAction::DetailLoaded(order) => {
                self.loading = false;
                self.error = None;
                self.upsert(&order);
                self.detail = Some(*order);
            }
            OrdersAction::StatusUpdated(order) => {
                self.loading = false;
                self.error = None;
                self.upsert(&order);
            }
            OrdersAction::CheckoutStarted => {
                self.checkout = CheckoutStep::SelectingAddress;
                self.error = None;
                self.success = false;
            }
            OrdersAction::CheckoutAborted(message) => {
                self.loading = false;
                self.checkout = CheckoutStep::Idle;
                self.error = Some(message);
            }
            OrdersAction::AddressesLoaded(addresses) => {
                self.loading = false;
                self.error = None;
                let keep = self
                    .selected_address
                    .filter(|id| addresses.iter().any(|a| a.id == *id));
                self.selected_address = keep.or_else(|| {
                    addresses
                        .iter()
                        .find(|a| a.is_default)
                        .or_else(|| addresses.first())
                        .map(|a| a.id)
                });
                self.addresses = addresses;
            }
            OrdersAction::AddressCreated(address) => {
                self.loading = false;
                self.error = None;
                self.selected_address = Some(address.id);
                if address.is_default {
                    for existing in &mut self.addresses {
                        existing.is_default = false;
                    }
                }
                self.addresses.push(address);
            }
            OrdersAction::AddressSelected(id) => {
                if self.addresses.iter().any(|a| a.id == id) {
                    self.selected_address = Some(id);
                    self.error = None;
                }
            }
            OrdersAction::OrderSubmitted => {
                self.loading = true;
                self.error = None;
                self.checkout = CheckoutStep::Submitting;
            }
            OrdersAction::OrderPlaced(order) => {
                self.loading = false;
                self.error = None;
                self.success = true;
                self.checkout = CheckoutStep::Confirmed(order.id);
                self.orders.retain(|o| o.id != order.id);
                self.orders.insert(0, (*order).clone());
                self.detail = Some(*order);
            }
            OrdersAction::CheckoutFailed(message) => {
                self.loading = false;
                self.error = Some(message);
                self.checkout = CheckoutStep::SelectingAddress;
            }
            OrdersAction::CartRefreshed => {
                if let CheckoutStep::Confirmed(id) = self.checkout {
                    self.checkout = CheckoutStep::CartRefreshed(id);
                }
            }
            OrdersAction::ResetOrderSuccess => self.success = false,
            OrdersAction::CheckoutReset => {
                self.checkout = CheckoutStep::Idle;
                self.success = false;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdersAction {
    Request,
    Failed(String),
    ListLoaded(Vec<Order>),
    DetailLoaded(Box<Order>),
    StatusUpdated(Box<Order>),
    CheckoutStarted,
    CheckoutAborted(String),
    AddressesLoaded(Vec<Address>),
    AddressCreated(Address),
    AddressSelected(AddressId),
    OrderSubmitted,
    OrderPlaced(Box<Order>),
    CheckoutFailed(String),
    CartRefreshed,
    ResetOrderSuccess,
    CheckoutReset,
}
