//! Authentication slice.

use crate::api::Profile;

/// Who is signed in, and the state of the last login/registration attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub loading: bool,
    pub error: Option<String>,
    /// Profile of the signed-in user; `None` when anonymous.
    pub profile: Option<Profile>,
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    pub(crate) fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::Request => {
                self.loading = true;
                self.error = None;
            }
            AuthAction::Succeeded(profile) | AuthAction::Restored(profile) => {
                self.loading = false;
                self.error = None;
                self.profile = Some(profile);
            }
            AuthAction::Failed(message) => {
                self.loading = false;
                self.error = Some(message);
                self.profile = None;
            }
            AuthAction::LoggedOut => *self = Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// A login or registration request started.
    Request,
    /// Login or registration succeeded and the session was persisted.
    Succeeded(Profile),
    /// Login or registration failed.
    Failed(String),
    /// The session was cleared.
    LoggedOut,
    /// A persisted session was loaded at startup.
    Restored(Profile),
}

#[cfg(test)]
mod tests {
    use cartwheel_core::UserId;

    use super::*;

    fn profile() -> Profile {
        Profile {
            id: UserId::new(1),
            username: "ada".to_string(),
            name: String::new(),
            email: String::new(),
            is_admin: false,
        }
    }

    #[test]
    fn test_login_flow() {
        let mut state = AuthState::default();
        state.reduce(AuthAction::Request);
        assert!(state.loading);

        state.reduce(AuthAction::Succeeded(profile()));
        assert!(!state.loading);
        assert!(state.is_authenticated());
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_failure_leaves_anonymous() {
        let mut state = AuthState::default();
        state.reduce(AuthAction::Request);
        state.reduce(AuthAction::Failed("Invalid credentials".to_string()));
        assert!(!state.is_authenticated());
        assert_eq!(state.error.as_deref(), Some("Invalid credentials"));

        // The next attempt clears the previous error
        state.reduce(AuthAction::Request);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut state = AuthState::default();
        state.reduce(AuthAction::Restored(profile()));
        state.reduce(AuthAction::LoggedOut);
        let once = state.clone();
        state.reduce(AuthAction::LoggedOut);
        assert_eq!(state, once);
        assert_eq!(state, AuthState::default());
    }
}
