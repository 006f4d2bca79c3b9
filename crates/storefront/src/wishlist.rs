//! Client-only wishlist kept in local storage.
//!
//! The wishlist is never sent to the server. Every operation reads the full
//! list from storage and, when it changes, rewrites the full list. Entries are
//! kept ordered by product id, so toggling a product on and off leaves the
//! stored list exactly as it was.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cartwheel_core::{Price, ProductId};

use crate::api::{Product, ProductSnapshot};
use crate::storage::{self, KeyValueStore, StorageError, keys};

/// A saved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(rename = "product")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&Product> for WishlistEntry {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image_ref().map(str::to_string),
        }
    }
}

impl From<&ProductSnapshot> for WishlistEntry {
    fn from(product: &ProductSnapshot) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image_ref().map(str::to_string),
        }
    }
}

/// Wishlist backed by the `wishlist` storage key.
#[derive(Clone)]
pub struct Wishlist {
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Wishlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wishlist").finish_non_exhaustive()
    }
}

impl Wishlist {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Current entries in product id order. Missing or malformed storage
    /// reads as empty.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        let mut entries: Vec<WishlistEntry> =
            storage::read_json(self.storage.as_ref(), keys::WISHLIST).unwrap_or_default();
        entries.sort_by_key(|e| e.product_id);
        entries
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.entries().iter().any(|e| e.product_id == product_id)
    }

    /// Add `entry` if absent, remove it if present.
    ///
    /// Returns whether the product is in the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated list cannot be written.
    pub fn toggle(&self, entry: WishlistEntry) -> Result<bool, StorageError> {
        let mut entries = self.entries();
        let added = match entries.binary_search_by_key(&entry.product_id, |e| e.product_id) {
            Ok(index) => {
                entries.remove(index);
                false
            }
            Err(index) => {
                entries.insert(index, entry);
                true
            }
        };

        self.write(&entries)?;
        Ok(added)
    }

    /// Remove a product. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated list cannot be written.
    pub fn remove(&self, product_id: ProductId) -> Result<(), StorageError> {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|e| e.product_id != product_id);
        if entries.len() == before {
            return Ok(());
        }
        self.write(&entries)
    }

    fn write(&self, entries: &[WishlistEntry]) -> Result<(), StorageError> {
        if entries.is_empty() {
            self.storage.clear(keys::WISHLIST)
        } else {
            storage::write_json(self.storage.as_ref(), keys::WISHLIST, &entries)
        }
    }
}
