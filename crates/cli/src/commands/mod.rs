//! Command implementations.
//!
//! Each command drives a [`Dispatcher`](cartwheel_storefront::Dispatcher)
//! and renders the resulting state to a writer, so the same code prints to
//! the terminal and to a buffer in tests.

pub mod account;
pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod wishlist;

use std::io::Write;

use cartwheel_storefront::{ClientError, Outcome};
use thiserror::Error;

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// The client could not be set up.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The command needs a signed-in user.
    #[error("You need to log in first: run `cartwheel login`")]
    AuthRequired,

    /// The storefront reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The arguments were not usable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Whether the failure is worth reporting to error tracking.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        matches!(self, Self::Client(_) | Self::Io(_))
    }
}

/// Unwrap a dispatcher outcome into a command result.
pub fn settle<T>(outcome: Outcome<T>) -> Result<T, CliError> {
    match outcome {
        Outcome::Ok(value) => Ok(value),
        Outcome::AuthRequired => Err(CliError::AuthRequired),
        Outcome::Error(message) => Err(CliError::Failed(message)),
    }
}

/// Write a section heading.
pub fn heading(out: &mut dyn Write, title: &str) -> std::io::Result<()> {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}
