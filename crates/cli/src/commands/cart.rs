//! Cart commands.

use std::io::Write;

use cartwheel_core::{CartItemId, ProductId};
use cartwheel_storefront::Dispatcher;
use cartwheel_storefront::quantity::Change;
use cartwheel_storefront::store::CartState;

use super::{CliError, heading, settle};

/// Print the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded.
pub async fn show(dispatcher: &Dispatcher, out: &mut dyn Write) -> Result<(), CliError> {
    settle(dispatcher.fetch_cart().await)?;
    if !dispatcher.state().auth.is_authenticated() {
        writeln!(out, "Log in to see your cart.")?;
        return Ok(());
    }
    render(&dispatcher.state().cart, out)?;
    Ok(())
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns an error if not signed in or the server rejects the change.
pub async fn add(
    dispatcher: &Dispatcher,
    product_id: ProductId,
    quantity: u32,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    // Current cart and product give the stock ceiling
    settle(dispatcher.fetch_cart().await)?;
    if dispatcher.state().cart.find_by_product(product_id).is_none() {
        settle(dispatcher.fetch_product(product_id).await)?;
    }

    settle(dispatcher.add_to_cart(product_id, quantity).await)?;
    render(&dispatcher.state().cart, out)?;
    Ok(())
}

/// Set a line's quantity (clamped to stock; zero removes it).
///
/// # Errors
///
/// Returns an error if not signed in or the server rejects the change.
pub async fn set(
    dispatcher: &Dispatcher,
    item_id: CartItemId,
    quantity: u32,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    settle(dispatcher.fetch_cart().await)?;
    settle(dispatcher.set_quantity(item_id, quantity).await)?;
    render(&dispatcher.state().cart, out)?;
    Ok(())
}

/// Add one unit to a line.
///
/// # Errors
///
/// Returns an error if not signed in or the server rejects the change.
pub async fn increment(
    dispatcher: &Dispatcher,
    item_id: CartItemId,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    settle(dispatcher.fetch_cart().await)?;
    let change = settle(dispatcher.increment(item_id).await)?;
    report(change, out)?;
    render(&dispatcher.state().cart, out)?;
    Ok(())
}

/// Take one unit off a line; at one, remove it.
///
/// # Errors
///
/// Returns an error if not signed in or the server rejects the change.
pub async fn decrement(
    dispatcher: &Dispatcher,
    item_id: CartItemId,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    settle(dispatcher.fetch_cart().await)?;
    let change = settle(dispatcher.decrement(item_id).await)?;
    report(change, out)?;
    render(&dispatcher.state().cart, out)?;
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if not signed in or the server rejects the change.
pub async fn remove(
    dispatcher: &Dispatcher,
    item_id: CartItemId,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    settle(dispatcher.remove_item(item_id).await)?;
    render(&dispatcher.state().cart, out)?;
    Ok(())
}

fn report(change: Change, out: &mut dyn Write) -> std::io::Result<()> {
    match change {
        Change::AtLimit => writeln!(out, "No more stock available for that item."),
        Change::Disabled => writeln!(out, "Quantity cannot go below one."),
        Change::Remove => writeln!(out, "Item removed."),
        Change::Set(_) => Ok(()),
    }
}

/// Render the cart lines and totals.
pub fn render(cart: &CartState, out: &mut dyn Write) -> std::io::Result<()> {
    if cart.items.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }

    heading(out, "Cart")?;
    for item in &cart.items {
        writeln!(
            out,
            "[{}] {:<32} {:>3} x {:>9} = {:>10}",
            item.id,
            item.product.name,
            item.quantity,
            item.product.price.to_string(),
            item.line_total().to_string(),
        )?;
    }
    writeln!(
        out,
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal()
    )
}
