//! Persisted storage contract and shopper-scoped keys.
//!
//! Favorites live in a single string entry per scope (`wishlist:guest` or
//! `wishlist:<customer>`), holding the JSON-serialized ordered list. The
//! engine only needs get/set/remove; hosts back it with `localStorage`,
//! tests and storage-less browsers with [`MemoryStorage`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use wishlist_core::CustomerId;

/// Prefix of every scoped storage key.
pub const STORAGE_PREFIX: &str = "wishlist";

/// Unscoped key written by earlier versions of the storefront.
pub const LEGACY_STORAGE_KEY: &str = "wishlist";

/// Errors raised by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Storage is disabled or not present in this browsing context.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Reading an entry threw.
    #[error("Storage read failed: {0}")]
    Read(String),

    /// Writing or removing an entry threw (quota, private browsing).
    #[error("Storage write failed: {0}")]
    Write(String),
}

/// A synchronous string key/value store.
pub trait Storage {
    /// Read an entry; `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend throws.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write an entry, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend throws.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove an entry. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend throws.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Who the favorites belong to.
///
/// Implements `Debug` manually to redact the customer token.
#[derive(Clone, Default)]
pub enum ShopperIdentity {
    /// Anonymous shopper.
    #[default]
    Guest,
    /// Signed-in customer, identified by an opaque token.
    Customer(SecretString),
}

impl fmt::Debug for ShopperIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => f.write_str("Guest"),
            Self::Customer(_) => f.debug_tuple("Customer").field(&"[REDACTED]").finish(),
        }
    }
}

impl ShopperIdentity {
    /// Build an identity from an optional customer id; blank ids are guests.
    #[must_use]
    pub fn from_customer_id(customer: Option<CustomerId>) -> Self {
        match customer {
            Some(id) if !id.is_blank() => Self::Customer(SecretString::from(id.into_inner())),
            _ => Self::Guest,
        }
    }

    /// The storage key holding this shopper's favorites.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::Guest => format!("{STORAGE_PREFIX}:guest"),
            Self::Customer(token) => format!("{STORAGE_PREFIX}:{}", token.expose_secret()),
        }
    }

    /// Scope name safe to log.
    #[must_use]
    pub const fn scope(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Customer(_) => "customer",
        }
    }
}

/// Outcome of [`migrate_legacy_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// Guests keep using their own key; nothing is migrated.
    NotApplicable,
    /// No legacy entry exists.
    NothingToMigrate,
    /// The scoped key already exists; the legacy entry is left untouched.
    AlreadyScoped,
    /// The legacy entry was copied to the scoped key and removed.
    Migrated,
}

/// Move the unscoped legacy entry into a customer's scoped key.
///
/// Runs at most once per customer: the copy only happens when the scoped key
/// does not exist yet, and the legacy key is removed afterwards, so repeated
/// mounts are no-ops and an existing customer list is never overwritten.
///
/// # Errors
///
/// Returns `StorageError` if any storage access throws.
pub fn migrate_legacy_key<S: Storage + ?Sized>(
    storage: &S,
    identity: &ShopperIdentity,
) -> Result<Migration, StorageError> {
    if matches!(identity, ShopperIdentity::Guest) {
        return Ok(Migration::NotApplicable);
    }

    let Some(legacy) = storage.get_item(LEGACY_STORAGE_KEY)? else {
        return Ok(Migration::NothingToMigrate);
    };

    let scoped_key = identity.storage_key();
    if storage.get_item(&scoped_key)?.is_some() {
        return Ok(Migration::AlreadyScoped);
    }

    storage.set_item(&scoped_key, &legacy)?;
    storage.remove_item(LEGACY_STORAGE_KEY)?;
    Ok(Migration::Migrated)
}

/// In-memory storage, shared between clones.
///
/// Used when the browser exposes no `localStorage`, and by tests, which can
/// make reads or writes throw to exercise the fault paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    items: BTreeMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry.
    #[must_use]
    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.inner
            .borrow_mut()
            .items
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Read an entry without fault injection.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.borrow().items.get(key).cloned()
    }

    /// All stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().items.keys().cloned().collect()
    }

    /// Make every read throw.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.borrow_mut().fail_reads = fail;
    }

    /// Make every write and removal throw.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.borrow();
        if inner.fail_reads {
            return Err(StorageError::Read(format!("read of {key} refused")));
        }
        Ok(inner.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(StorageError::Write("quota exceeded".to_string()));
        }
        inner.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(StorageError::Write(format!("removal of {key} refused")));
        }
        inner.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn customer(id: &str) -> ShopperIdentity {
        ShopperIdentity::from_customer_id(Some(CustomerId::new(id)))
    }

    #[test]
    fn test_storage_keys_are_scoped() {
        assert_eq!(ShopperIdentity::Guest.storage_key(), "wishlist:guest");
        assert_eq!(customer("abc").storage_key(), "wishlist:abc");
    }

    #[test]
    fn test_blank_customer_is_guest() {
        assert!(matches!(
            ShopperIdentity::from_customer_id(Some(CustomerId::new(""))),
            ShopperIdentity::Guest
        ));
        assert!(matches!(
            ShopperIdentity::from_customer_id(None),
            ShopperIdentity::Guest
        ));
    }

    #[test]
    fn test_debug_redacts_customer_token() {
        let debug = format!("{:?}", customer("secret-token"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_migration_moves_legacy_entry() {
        let storage = MemoryStorage::new().with_item(LEGACY_STORAGE_KEY, "[1]");
        let outcome = migrate_legacy_key(&storage, &customer("abc")).unwrap();

        assert_eq!(outcome, Migration::Migrated);
        assert_eq!(storage.peek("wishlist:abc").as_deref(), Some("[1]"));
        assert_eq!(storage.peek(LEGACY_STORAGE_KEY), None);
    }

    #[test]
    fn test_migration_never_clobbers_scoped_list() {
        let storage = MemoryStorage::new()
            .with_item(LEGACY_STORAGE_KEY, "[\"guest\"]")
            .with_item("wishlist:abc", "[\"mine\"]");
        let outcome = migrate_legacy_key(&storage, &customer("abc")).unwrap();

        assert_eq!(outcome, Migration::AlreadyScoped);
        assert_eq!(storage.peek("wishlist:abc").as_deref(), Some("[\"mine\"]"));
    }

    #[test]
    fn test_migration_is_repeatable() {
        let storage = MemoryStorage::new().with_item(LEGACY_STORAGE_KEY, "[]");
        let identity = customer("abc");
        assert_eq!(
            migrate_legacy_key(&storage, &identity).unwrap(),
            Migration::Migrated
        );
        assert_eq!(
            migrate_legacy_key(&storage, &identity).unwrap(),
            Migration::NothingToMigrate
        );
    }

    #[test]
    fn test_migration_skips_guests() {
        let storage = MemoryStorage::new().with_item(LEGACY_STORAGE_KEY, "[]");
        assert_eq!(
            migrate_legacy_key(&storage, &ShopperIdentity::Guest).unwrap(),
            Migration::NotApplicable
        );
        assert!(storage.peek(LEGACY_STORAGE_KEY).is_some());
    }

    #[test]
    fn test_migration_surfaces_storage_faults() {
        let storage = MemoryStorage::new().with_item(LEGACY_STORAGE_KEY, "[]");
        storage.set_fail_reads(true);
        assert!(migrate_legacy_key(&storage, &customer("abc")).is_err());
    }

    #[test]
    fn test_memory_storage_clones_share_items() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();
        clone.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        storage.remove_item("k").unwrap();
        assert_eq!(clone.peek("k"), None);
    }
}
