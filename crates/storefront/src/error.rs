//! Client-level error and dispatch result types.
//!
//! `ClientError` wraps the per-module errors for setup paths that return
//! `Result`. Dispatchers return [`Outcome`] instead: an authentication
//! failure is a distinct, expected result rather than an error banner.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storefront API request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Config(err) => err.to_string(),
            Self::Storage(_) => "Could not access local storage".to_string(),
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Result of a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The action completed.
    Ok(T),
    /// The action needs a signed-in user; nothing was changed.
    AuthRequired,
    /// The action failed with a message already recorded in state.
    Error(String),
}

impl<T> Outcome<T> {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    #[must_use]
    pub const fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// The value, discarding the failure reason.
    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::AuthRequired | Self::Error(_) => None,
        }
    }

    /// The error message, if the action failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            Self::Ok(_) | Self::AuthRequired => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Ok(value) => Outcome::Ok(f(value)),
            Self::AuthRequired => Outcome::AuthRequired,
            Self::Error(message) => Outcome::Error(message),
        }
    }
}

impl<T> From<ApiError> for Outcome<T> {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            Self::AuthRequired
        } else {
            Self::Error(err.user_message())
        }
    }
}
