//! `localStorage` backend.

use wasm_bindgen::JsValue;
use wishlist_engine::storage::MemoryStorage;
use wishlist_engine::{Storage, StorageError};

/// Favorites persistence for the page.
///
/// Falls back to an in-memory map when the browser exposes no
/// `localStorage` (disabled storage, sandboxed frames); favorites then last
/// until the next page load.
#[derive(Debug)]
pub enum BrowserStorage {
    Local(web_sys::Storage),
    Memory(MemoryStorage),
}

impl BrowserStorage {
    pub fn from_window(window: &web_sys::Window) -> Self {
        match window.local_storage() {
            Ok(Some(storage)) => Self::Local(storage),
            Ok(None) => {
                tracing::warn!("localStorage unavailable; favorites will not persist");
                Self::Memory(MemoryStorage::new())
            }
            Err(e) => {
                tracing::warn!(error = %describe(&e), "localStorage blocked; favorites will not persist");
                Self::Memory(MemoryStorage::new())
            }
        }
    }
}

impl Storage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Local(storage) => storage
                .get_item(key)
                .map_err(|e| StorageError::Read(describe(&e))),
            Self::Memory(storage) => storage.get_item(key),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Local(storage) => storage
                .set_item(key, value)
                .map_err(|e| StorageError::Write(describe(&e))),
            Self::Memory(storage) => storage.set_item(key, value),
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Local(storage) => storage
                .remove_item(key)
                .map_err(|e| StorageError::Write(describe(&e))),
            Self::Memory(storage) => storage.remove_item(key),
        }
    }
}

/// Readable text for a thrown JS value (`QuotaExceededError`, ...).
pub fn describe(error: &JsValue) -> String {
    error
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(error, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .unwrap_or_else(|| format!("{error:?}"))
}
