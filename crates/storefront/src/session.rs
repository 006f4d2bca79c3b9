//! Persisted user session.
//!
//! A session is the pair of the bearer credential (`accessToken`, stored raw)
//! and the user profile (`userInfo`, stored as JSON). Both keys are written
//! together on login and cleared together on logout; a half-present pair is
//! treated as no session and cleaned up on load.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::api::Profile;
use crate::storage::{self, KeyValueStore, StorageError, keys};

// =============================================================================
// AccessToken
// =============================================================================

/// Bearer credential issued by the storefront API.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw credential.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw credential, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<SecretString> for AccessToken {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for AccessToken {}

/// Read the stored credential, ignoring blank values.
pub(crate) fn stored_token(storage: &dyn KeyValueStore) -> Option<AccessToken> {
    match storage.get(keys::ACCESS_TOKEN) {
        Ok(Some(raw)) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| AccessToken::new(trimmed))
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored credential");
            None
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: AccessToken,
    pub profile: Profile,
}

/// Reads and writes the session in a key/value store.
#[derive(Clone)]
pub struct SessionRepository {
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRepository").finish_non_exhaustive()
    }
}

impl SessionRepository {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Load the persisted session.
    ///
    /// Returns `None` when either half is missing or unreadable. In that case
    /// any leftover half is cleared so storage and state agree.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let token = stored_token(self.storage.as_ref());
        let profile: Option<Profile> = storage::read_json(self.storage.as_ref(), keys::USER_INFO);

        match (token, profile) {
            (Some(token), Some(profile)) => Some(Session { token, profile }),
            (None, None) => None,
            _ => {
                tracing::warn!("Discarding incomplete persisted session");
                if let Err(e) = self.clear() {
                    tracing::warn!(error = %e, "Failed to clear incomplete session");
                }
                None
            }
        }
    }

    /// Persist `session`, replacing any previous one.
    ///
    /// The profile is written before the credential so a failure in between
    /// never leaves a credential without a profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either key cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        storage::write_json(self.storage.as_ref(), keys::USER_INFO, &session.profile)?;
        self.storage
            .set(keys::ACCESS_TOKEN, session.token.expose())
    }

    /// Remove the persisted session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either key cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.clear(keys::ACCESS_TOKEN)?;
        self.storage.clear(keys::USER_INFO)
    }

    /// Whether a credential is stored.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        stored_token(self.storage.as_ref()).is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::UserId;

    use super::*;
    use crate::storage::MemoryStore;

    fn profile() -> Profile {
        Profile {
            id: UserId::new(1),
            username: "ada".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            is_admin: false,
        }
    }

    fn repo() -> (Arc<MemoryStore>, SessionRepository) {
        let storage = Arc::new(MemoryStore::new());
        let repo = SessionRepository::new(storage.clone());
        (storage, repo)
    }

    #[test]
    fn test_save_then_load() {
        let (storage, repo) = repo();
        let session = Session {
            token: AccessToken::new("tok"),
            profile: profile(),
        };
        repo.save(&session).unwrap();

        assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok"));
        assert_eq!(repo.load(), Some(session));
        assert!(repo.has_credential());
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let (storage, repo) = repo();
        repo.save(&Session {
            token: AccessToken::new("tok"),
            profile: profile(),
        })
        .unwrap();

        repo.clear().unwrap();
        assert!(storage.is_empty());
        assert_eq!(repo.load(), None);
    }

    #[test]
    fn test_half_session_is_discarded() {
        let (storage, repo) = repo();
        storage.set(keys::ACCESS_TOKEN, "tok").unwrap();

        assert_eq!(repo.load(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_malformed_profile_is_discarded() {
        let (storage, repo) = repo();
        storage.set(keys::ACCESS_TOKEN, "tok").unwrap();
        storage.set(keys::USER_INFO, "{broken").unwrap();

        assert_eq!(repo.load(), None);
        assert!(!repo.has_credential());
    }

    #[test]
    fn test_blank_token_is_no_credential() {
        let (storage, repo) = repo();
        storage.set(keys::ACCESS_TOKEN, "  ").unwrap();
        assert!(!repo.has_credential());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
