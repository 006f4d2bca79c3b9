//! Action dispatchers.
//!
//! Each dispatcher wraps one or more API calls and turns the result into
//! store actions. Dispatchers never fail with `Err`: they return an
//! [`Outcome`](crate::error::Outcome) and record any user-facing message in the
//! relevant state slice.
//!
//! # Dispatchers
//!
//! - **Auth**: `login`, `register`, `logout`, `restore`
//! - **Cart**: `fetch_cart`, `add_to_cart`, `update_item`, `set_quantity`,
//!   `increment`, `decrement`, `remove_item`
//! - **Products**: `list_products`, `fetch_product`, `submit_review`
//! - **Orders**: `begin_checkout`, `list_addresses`, `select_address`,
//!   `create_address`, `place_order`, `fetch_orders`, `fetch_order`,
//!   `update_order_status`

mod auth;
mod cart;
mod orders;
mod products;

use std::sync::Arc;

use crate::api::{HttpClient, StorefrontApi};
use crate::config::{ClientConfig, DEFAULT_PAGE_SIZE};
use crate::error::ClientError;
use crate::session::SessionRepository;
use crate::storage::{FileStore, KeyValueStore};
use crate::store::{AppState, AuthAction, Store};
use crate::wishlist::Wishlist;

/// Entry point for every state-changing operation.
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn StorefrontApi>,
    store: Arc<Store>,
    session: SessionRepository,
    wishlist: Wishlist,
    page_size: u32,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher over `api`, persisting session and wishlist in `storage`.
    #[must_use]
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        store: Arc<Store>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            api,
            store,
            session: SessionRepository::new(storage.clone()),
            wishlist: Wishlist::new(storage),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Build the file-backed HTTP client from `config` and restore the saved session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.state_dir.clone()));
        let api = HttpClient::new(config, storage.clone())?;

        tracing::debug!(
            api_url = %config.api_url,
            state_dir = %config.state_dir.display(),
            "Storefront client ready"
        );

        let dispatcher = Self::new(Arc::new(api), Arc::new(Store::default()), storage)
            .with_page_size(config.page_size);
        dispatcher.restore();
        Ok(dispatcher)
    }

    /// Products per listing page.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Clone of the current state.
    #[must_use]
    pub fn state(&self) -> AppState {
        self.store.state()
    }

    #[must_use]
    pub const fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    #[must_use]
    pub const fn session(&self) -> &SessionRepository {
        &self.session
    }

    fn has_credential(&self) -> bool {
        self.session.has_credential()
    }

    /// Forget a credential the server has rejected.
    ///
    /// The signed-in state is dropped even if storage cannot be cleared; a
    /// stale credential left on disk is rejected again on next use.
    fn expire_session(&self) {
        tracing::info!("Stored credential was rejected, signing out");
        if let Err(e) = self.session.clear() {
            tracing::warn!(error = %e, "Failed to clear rejected session");
        }
        self.store.dispatch(AuthAction::LoggedOut);
    }
}
