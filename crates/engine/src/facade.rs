//! Programmatic API for other page scripts.
//!
//! Facade mutations go through the same store decision and sync cascade as
//! clicks, so a Facade call and a button click can never disagree about
//! membership.

use tracing::instrument;
use wishlist_core::{FavoriteEntry, FavoriteInput};

use crate::dom::Page;
use crate::engine::Wishlist;
use crate::storage::Storage;

impl<P: Page, S: Storage> Wishlist<P, S> {
    /// Add a favorite.
    ///
    /// Returns whether it was added: input without an id, or whose key is
    /// already a favorite, is refused.
    #[instrument(skip(self, item))]
    pub fn add(&mut self, item: FavoriteInput) -> bool {
        let entry = match item.normalize() {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "Refusing favorite");
                return false;
            }
        };

        let added = self.store_mut().add(entry);
        if added {
            self.after_mutation(None);
        }
        added
    }

    /// Remove the favorite with `key`. Returns whether one was removed.
    #[instrument(skip(self))]
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.store_mut().remove(key);
        if removed {
            self.after_mutation(None);
        }
        removed
    }

    /// Toggle a favorite. Returns whether it is a favorite afterwards.
    #[instrument(skip(self, item))]
    pub fn toggle(&mut self, item: FavoriteInput) -> bool {
        let entry = match item.normalize() {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "Refusing favorite");
                return false;
            }
        };

        let toggled = self.store_mut().toggle(entry);
        self.after_mutation(None);
        toggled.is_favorite()
    }

    /// A copy of the favorites, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<FavoriteEntry> {
        self.store().entries().to_vec()
    }

    /// Open the drawer.
    #[instrument(skip(self))]
    pub fn open(&mut self) {
        self.open_drawer();
    }

    /// Close the drawer.
    #[instrument(skip(self))]
    pub fn close(&mut self) {
        self.close_drawer();
    }
}
