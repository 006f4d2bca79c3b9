//! Wishlist commands. The wishlist lives only on this device.

use std::io::Write;

use cartwheel_core::ProductId;
use cartwheel_storefront::Dispatcher;
use cartwheel_storefront::wishlist::WishlistEntry;

use super::{CliError, heading, settle};

/// List saved products.
///
/// # Errors
///
/// Returns an error only if output fails.
pub fn list(dispatcher: &Dispatcher, out: &mut dyn Write) -> Result<(), CliError> {
    let entries = dispatcher.wishlist().entries();
    if entries.is_empty() {
        writeln!(out, "Your wishlist is empty.")?;
        return Ok(());
    }
    heading(out, "Wishlist")?;
    for entry in &entries {
        writeln!(
            out,
            "#{:<5} {:<32} {:>10}",
            entry.product_id,
            entry.name,
            entry.price.to_string()
        )?;
    }
    Ok(())
}

/// Save a product, or unsave it if already saved.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded or the wishlist cannot be written.
pub async fn toggle(
    dispatcher: &Dispatcher,
    product_id: ProductId,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let product = settle(dispatcher.fetch_product(product_id).await)?;
    let added = dispatcher
        .wishlist()
        .toggle(WishlistEntry::from(&product))
        .map_err(|e| CliError::Client(e.into()))?;

    if added {
        writeln!(out, "Added {} to your wishlist.", product.name)?;
    } else {
        writeln!(out, "Removed {} from your wishlist.", product.name)?;
    }
    Ok(())
}

/// Remove a product from the wishlist.
///
/// # Errors
///
/// Returns an error if the wishlist cannot be written.
pub fn remove(
    dispatcher: &Dispatcher,
    product_id: ProductId,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    dispatcher
        .wishlist()
        .remove(product_id)
        .map_err(|e| CliError::Client(e.into()))?;
    writeln!(out, "Removed.")?;
    Ok(())
}
