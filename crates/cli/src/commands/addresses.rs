//! Saved address commands.

use std::io::Write;

use cartwheel_storefront::Dispatcher;
use cartwheel_storefront::api::{Address, NewAddress};

use super::{CliError, heading, settle};

/// List saved addresses.
///
/// # Errors
///
/// Returns an error if not signed in or the list cannot be loaded.
pub async fn list(dispatcher: &Dispatcher, out: &mut dyn Write) -> Result<(), CliError> {
    let addresses = settle(dispatcher.list_addresses().await)?;
    if addresses.is_empty() {
        writeln!(out, "No saved addresses. Add one with `cartwheel addresses add`.")?;
        return Ok(());
    }
    heading(out, "Addresses")?;
    for address in &addresses {
        render(address, out)?;
    }
    Ok(())
}

/// Save a new address.
///
/// # Errors
///
/// Returns an error if not signed in or the address is rejected.
pub async fn add(
    dispatcher: &Dispatcher,
    address: &NewAddress,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let created = settle(dispatcher.create_address(address).await)?;
    writeln!(out, "Saved address #{}.", created.id)?;
    Ok(())
}

/// One address line.
pub fn render(address: &Address, out: &mut dyn Write) -> std::io::Result<()> {
    let marker = if address.is_default { " (default)" } else { "" };
    writeln!(out, "#{} {address}{marker}", address.id)
}
