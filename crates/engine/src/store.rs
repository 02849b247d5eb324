//! The favorites store: canonical ordered collection plus persistence.
//!
//! The collection is key-unique (variant id, falling back to product id) and
//! kept in insertion order. Every successful mutation is persisted
//! immediately; persistence failures are logged and swallowed, leaving the
//! in-memory collection authoritative for the rest of the page.

use serde_json::Value;
use wishlist_core::{FavoriteEntry, FavoriteInput};

use crate::error::Result;
use crate::storage::Storage;

/// Result of [`FavoriteStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    /// The entry was not a favorite and has been appended.
    Added,
    /// The entry was a favorite and has been removed.
    Removed,
}

impl Toggled {
    /// Whether the entry is a favorite after the toggle.
    #[must_use]
    pub const fn is_favorite(self) -> bool {
        matches!(self, Self::Added)
    }
}

/// Owner of the shopper's favorites.
#[derive(Debug)]
pub struct FavoriteStore<S> {
    storage: S,
    key: String,
    entries: Vec<FavoriteEntry>,
}

impl<S: Storage> FavoriteStore<S> {
    /// Load the collection stored under `key`.
    ///
    /// Never fails: an absent key, unparsable data, a non-list value or a
    /// throwing backend all yield an empty collection. Stored items that
    /// cannot be normalized are skipped, and duplicate keys keep their first
    /// occurrence.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = match storage.get_item(&key) {
            Ok(Some(raw)) => parse_collection(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read favorites; starting empty");
                Vec::new()
            }
        };

        tracing::debug!(count = entries.len(), "Loaded favorites");
        Self {
            storage,
            key,
            entries,
        }
    }

    /// Append an entry unless its key is blank or already present.
    ///
    /// Returns whether the entry was added.
    pub fn add(&mut self, entry: FavoriteEntry) -> bool {
        if entry.key().is_blank() || self.contains(entry.key().as_str()) {
            return false;
        }

        tracing::debug!(key = %entry.key(), "Favorite added");
        self.entries.push(entry);
        self.persist();
        true
    }

    /// Remove the entry with the given key.
    ///
    /// Returns whether a removal occurred.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };

        self.entries.remove(index);
        tracing::debug!(key, "Favorite removed");
        self.persist();
        true
    }

    /// Remove the entry if present, append it otherwise.
    ///
    /// This is the only place the add/remove decision is made.
    pub fn toggle(&mut self, entry: FavoriteEntry) -> Toggled {
        if let Some(index) = self.position(entry.key().as_str()) {
            self.entries.remove(index);
            tracing::debug!(key = %entry.key(), "Favorite toggled off");
            self.persist();
            Toggled::Removed
        } else {
            tracing::debug!(key = %entry.key(), "Favorite toggled on");
            self.entries.push(entry);
            self.persist();
            Toggled::Added
        }
    }

    /// Whether an entry with the given key exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Write the whole collection to storage, logging any failure.
    pub fn persist(&self) {
        if let Err(e) = self.try_persist() {
            tracing::warn!(error = %e, "Failed to persist favorites; keeping in-memory state");
        }
    }

    /// Write the whole collection to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the backend throws.
    pub fn try_persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.entries)?;
        self.storage.set_item(&self.key, &raw)?;
        Ok(())
    }

    /// The favorites in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    /// Number of favorites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no favorites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The storage key this store reads and writes.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key().as_str() == key)
    }
}

/// Parse a stored collection, tolerating bad data item by item.
fn parse_collection(raw: &str) -> Vec<FavoriteEntry> {
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            tracing::warn!("Stored favorites are not a list; starting empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Stored favorites are not valid JSON; starting empty");
            return Vec::new();
        }
    };

    let mut entries: Vec<FavoriteEntry> = Vec::with_capacity(items.len());
    for item in items {
        let entry = serde_json::from_value::<FavoriteInput>(item)
            .ok()
            .and_then(|input| input.normalize().ok());
        match entry {
            Some(entry) if !entries.iter().any(|e| e.key() == entry.key()) => entries.push(entry),
            Some(entry) => tracing::debug!(key = %entry.key(), "Skipping duplicate stored favorite"),
            None => tracing::debug!("Skipping malformed stored favorite"),
        }
    }
    entries
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wishlist_core::Price;

    use super::*;
    use crate::storage::MemoryStorage;

    const KEY: &str = "wishlist:guest";

    fn entry(id: &str) -> FavoriteEntry {
        FavoriteInput::new(id)
            .title(format!("Product {id}"))
            .url(format!("/products/{id}"))
            .price(Price::from_minor_units(1000))
            .normalize()
            .unwrap()
    }

    fn keys<S: Storage>(store: &FavoriteStore<S>) -> Vec<&str> {
        store.entries().iter().map(|e| e.key().as_str()).collect()
    }

    #[test]
    fn test_load_absent_key_is_empty() {
        let store = FavoriteStore::load(MemoryStorage::new(), KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_invalid_json_is_empty() {
        let storage = MemoryStorage::new().with_item(KEY, "{not json");
        assert!(FavoriteStore::load(storage, KEY).is_empty());
    }

    #[test]
    fn test_load_non_list_is_empty() {
        let storage = MemoryStorage::new().with_item(KEY, r#"{"id": "1"}"#);
        assert!(FavoriteStore::load(storage, KEY).is_empty());
    }

    #[test]
    fn test_load_throwing_storage_is_empty() {
        let storage = MemoryStorage::new().with_item(KEY, "[]");
        storage.set_fail_reads(true);
        assert!(FavoriteStore::load(storage, KEY).is_empty());
    }

    #[test]
    fn test_load_skips_bad_items_and_duplicates() {
        let raw = r#"[{"id": "1"}, 42, {"title": "no id"}, {"id": "2"}, {"id": "1"}]"#;
        let storage = MemoryStorage::new().with_item(KEY, raw);
        let store = FavoriteStore::load(storage, KEY);
        assert_eq!(keys(&store), vec!["1", "2"]);
    }

    #[test]
    fn test_add_is_unique_by_key() {
        let mut store = FavoriteStore::load(MemoryStorage::new(), KEY);
        assert!(store.add(entry("1")));
        assert!(!store.add(entry("1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_refuses_blank_key() {
        let mut store = FavoriteStore::load(MemoryStorage::new(), KEY);
        let mut blank = entry("1");
        blank.variant_id = "".into();
        assert!(!store.add(blank));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_reports_whether_removed() {
        let mut store = FavoriteStore::load(MemoryStorage::new(), KEY);
        store.add(entry("1"));
        assert!(store.remove("1"));
        assert!(!store.remove("1"));
    }

    #[test]
    fn test_toggle_is_self_inverse() {
        let mut store = FavoriteStore::load(MemoryStorage::new(), KEY);
        store.add(entry("1"));
        store.add(entry("2"));
        let before = store.entries().to_vec();

        assert_eq!(store.toggle(entry("3")), Toggled::Added);
        assert_eq!(store.toggle(entry("3")), Toggled::Removed);
        assert_eq!(store.entries(), before.as_slice());
    }

    #[test]
    fn test_readding_moves_entry_to_end() {
        let mut store = FavoriteStore::load(MemoryStorage::new(), KEY);
        store.add(entry("1"));
        store.add(entry("2"));
        store.toggle(entry("1"));
        store.toggle(entry("1"));
        assert_eq!(keys(&store), vec!["2", "1"]);
    }

    #[test]
    fn test_mutations_persist() {
        let storage = MemoryStorage::new();
        let mut store = FavoriteStore::load(storage.clone(), KEY);
        store.add(entry("1"));

        let reloaded = FavoriteStore::load(storage, KEY);
        assert_eq!(reloaded.entries(), store.entries());
    }

    #[test]
    fn test_persist_round_trip_preserves_fields() {
        let storage = MemoryStorage::new();
        let mut store = FavoriteStore::load(storage.clone(), KEY);
        let full = FavoriteInput::new("7")
            .variant("70")
            .title("Shirt")
            .url("/p/7")
            .price(Price::from_minor_units(2550))
            .image("https://cdn.example/shirt.jpg")
            .normalize()
            .unwrap();
        store.add(full.clone());
        store.add(entry("8"));

        let reloaded = FavoriteStore::load(storage, KEY);
        assert_eq!(reloaded.entries().first(), Some(&full));
        assert_eq!(reloaded.entries(), store.entries());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let mut store = FavoriteStore::load(storage.clone(), KEY);

        assert!(store.add(entry("1")));
        assert!(store.contains("1"));
        assert!(store.try_persist().is_err());
        assert_eq!(storage.peek(KEY), None);
    }
}
