//! Checkout and order history commands.

use std::io::Write;

use cartwheel_core::{AddressId, OrderId, OrderStatus};
use cartwheel_storefront::Dispatcher;
use cartwheel_storefront::api::Order;

use super::{CliError, addresses, cart, heading, settle};

/// Place an order for the current cart.
///
/// Ships to `address` when given, otherwise to the preselected default.
///
/// # Errors
///
/// Returns an error if not signed in, the cart is empty or the order is rejected.
pub async fn checkout(
    dispatcher: &Dispatcher,
    address: Option<AddressId>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    settle(dispatcher.fetch_cart().await)?;
    settle(dispatcher.begin_checkout().await)?;

    if let Some(id) = address {
        settle(dispatcher.select_address(id))?;
    }

    let state = dispatcher.state();
    let Some(selected) = state.orders.selected() else {
        dispatcher.reset_checkout();
        return Err(CliError::Failed(
            "No shipping address. Add one with `cartwheel addresses add`.".to_string(),
        ));
    };

    cart::render(&state.cart, out)?;
    write!(out, "Ship to: ")?;
    addresses::render(selected, out)?;

    let order = settle(dispatcher.place_order().await)?;
    writeln!(out)?;
    writeln!(out, "Order #{} placed. Thank you!", order.id)?;
    render(&order, out)?;
    dispatcher.reset_order_success();
    Ok(())
}

/// List past orders.
///
/// # Errors
///
/// Returns an error if not signed in or the list cannot be loaded.
pub async fn list(dispatcher: &Dispatcher, out: &mut dyn Write) -> Result<(), CliError> {
    let orders = settle(dispatcher.fetch_orders().await)?;
    if orders.is_empty() {
        writeln!(out, "No orders yet.")?;
        return Ok(());
    }
    heading(out, "Orders")?;
    for order in &orders {
        let date = order
            .created_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "#{:<6} {:<10} {:<10} {:>10}",
            order.id,
            date,
            order.status.as_str(),
            order.total_price.to_string()
        )?;
    }
    Ok(())
}

/// Show one order.
///
/// # Errors
///
/// Returns an error if not signed in or the order cannot be loaded.
pub async fn show(dispatcher: &Dispatcher, id: OrderId, out: &mut dyn Write) -> Result<(), CliError> {
    let order = settle(dispatcher.fetch_order(id).await)?;
    render(&order, out)?;
    Ok(())
}

/// Change an order's status.
///
/// # Errors
///
/// Returns an error if not signed in or the change is rejected.
pub async fn set_status(
    dispatcher: &Dispatcher,
    id: OrderId,
    status: OrderStatus,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let order = settle(dispatcher.update_order_status(id, status).await)?;
    writeln!(out, "Order #{} is now {}.", order.id, order.status)?;
    Ok(())
}

fn render(order: &Order, out: &mut dyn Write) -> std::io::Result<()> {
    heading(out, &format!("Order #{}", order.id))?;
    writeln!(out, "Status: {}", order.status)?;
    if let Some(created) = order.created_at {
        writeln!(out, "Placed: {}", created.format("%Y-%m-%d %H:%M"))?;
    }
    let ship = &order.shipping;
    writeln!(
        out,
        "Ship to: {}, {}, {} - {}",
        ship.street, ship.city, ship.country, ship.postal_code
    )?;
    for item in &order.items {
        writeln!(
            out,
            "  {:<32} {:>3} x {:>9}",
            item.product.name,
            item.quantity,
            item.unit_price.to_string()
        )?;
    }
    writeln!(out, "Total: {}", order.total_price)
}
