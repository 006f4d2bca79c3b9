//! Account commands: login, register, logout, whoami.

use std::io::{BufRead, Write};

use secrecy::SecretString;

use cartwheel_storefront::Dispatcher;
use cartwheel_storefront::api::Registration;

use super::{CliError, settle};

/// Use the given password, or read one line from `input`.
///
/// # Errors
///
/// Returns an error if nothing usable could be read.
pub fn resolve_password(
    given: Option<String>,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<SecretString, CliError> {
    let password = if let Some(password) = given {
        password
    } else {
        write!(out, "Password: ")?;
        out.flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_string()
    };

    if password.is_empty() {
        return Err(CliError::InvalidInput("password must not be empty".to_string()));
    }
    Ok(SecretString::from(password))
}

/// Sign in.
///
/// # Errors
///
/// Returns an error if the credentials are rejected.
pub async fn login(
    dispatcher: &Dispatcher,
    username: &str,
    password: &SecretString,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let profile = settle(dispatcher.login(username, password).await)?;
    writeln!(out, "Welcome back, {}!", profile.display_name())?;
    Ok(())
}

/// Create an account and sign in.
///
/// # Errors
///
/// Returns an error if the account cannot be created.
pub async fn register(
    dispatcher: &Dispatcher,
    registration: &Registration,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let profile = settle(dispatcher.register(registration).await)?;
    writeln!(out, "Account created. Signed in as {}.", profile.username)?;
    Ok(())
}

/// Sign out of this device.
///
/// # Errors
///
/// Returns an error if the saved session cannot be removed.
pub fn logout(dispatcher: &Dispatcher, out: &mut dyn Write) -> Result<(), CliError> {
    let was_signed_in = dispatcher.state().auth.is_authenticated();
    settle(dispatcher.logout())?;
    if was_signed_in {
        writeln!(out, "Signed out.")?;
    } else {
        writeln!(out, "You were not signed in.")?;
    }
    Ok(())
}

/// Show the signed-in user.
///
/// # Errors
///
/// Returns an error only if output fails.
pub fn whoami(dispatcher: &Dispatcher, out: &mut dyn Write) -> Result<(), CliError> {
    match dispatcher.state().auth.profile {
        Some(profile) => {
            writeln!(out, "{} ({})", profile.display_name(), profile.username)?;
            if !profile.email.is_empty() {
                writeln!(out, "Email: {}", profile.email)?;
            }
            if profile.is_admin {
                writeln!(out, "Role: administrator")?;
            }
        }
        None => writeln!(out, "Not signed in.")?,
    }
    Ok(())
}
