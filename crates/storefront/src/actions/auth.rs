//! Login, registration and logout.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::Dispatcher;
use crate::api::{AuthResponse, Profile, Registration};
use crate::error::Outcome;
use crate::session::Session;
use crate::store::AuthAction;

const MIN_PASSWORD_LEN: usize = 8;

impl Dispatcher {
    /// Sign in and persist the session.
    ///
    /// On failure the error is recorded in the auth slice and storage is
    /// left untouched.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Outcome<Profile> {
        self.store.dispatch(AuthAction::Request);
        let result = self.api.login(username.trim(), password).await;
        self.finish_auth(result)
    }

    /// Create an account, then sign in as it.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Outcome<Profile> {
        if let Some(problem) = validate_registration(registration) {
            self.store.dispatch(AuthAction::Failed(problem.clone()));
            return Outcome::Error(problem);
        }

        self.store.dispatch(AuthAction::Request);
        let result = self.api.register(registration).await;
        self.finish_auth(result)
    }

    fn finish_auth(
        &self,
        result: Result<AuthResponse, crate::api::ApiError>,
    ) -> Outcome<Profile> {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                // A rejected login is a bad credential, not a missing session
                let message = e.user_message();
                tracing::info!(error = %e, "Authentication failed");
                self.store.dispatch(AuthAction::Failed(message.clone()));
                return Outcome::Error(message);
            }
        };

        let session = Session {
            token: response.access.into(),
            profile: response.profile,
        };

        // Storage first, so state never claims a session storage lacks
        if let Err(e) = self.session.save(&session) {
            tracing::error!(error = %e, "Failed to persist session");
            // Leave no half-written session behind
            if let Err(e) = self.session.clear() {
                tracing::warn!(error = %e, "Failed to clear partially saved session");
            }
            let message = "Could not save your session".to_string();
            self.store.dispatch(AuthAction::Failed(message.clone()));
            return Outcome::Error(message);
        }

        tracing::info!(user_id = %session.profile.id, "Signed in");
        self.store
            .dispatch(AuthAction::Succeeded(session.profile.clone()));
        Outcome::Ok(session.profile)
    }

    /// Sign out locally: clear the persisted session, then the state.
    ///
    /// If storage cannot be cleared the state is left signed in, so the two
    /// never disagree.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Outcome<()> {
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "Failed to clear persisted session");
            return Outcome::Error("Could not sign out".to_string());
        }
        self.store.dispatch(AuthAction::LoggedOut);
        tracing::info!("Signed out");
        Outcome::Ok(())
    }

    /// Seed the auth slice from the persisted session.
    #[instrument(skip(self))]
    pub fn restore(&self) -> Option<Profile> {
        match self.session.load() {
            Some(session) => {
                tracing::debug!(user_id = %session.profile.id, "Restored session");
                self.store
                    .dispatch(AuthAction::Restored(session.profile.clone()));
                Some(session.profile)
            }
            None => {
                if self.store.with(|s| s.auth.is_authenticated()) {
                    self.store.dispatch(AuthAction::LoggedOut);
                }
                None
            }
        }
    }
}

fn validate_registration(registration: &Registration) -> Option<String> {
    if registration.username.trim().is_empty() {
        return Some("Username is required".to_string());
    }
    let email = registration.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Some("A valid email address is required".to_string());
    }
    if registration.password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        return Some(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    None
}
