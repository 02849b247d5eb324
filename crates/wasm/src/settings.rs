//! Wishlist configuration from the page's globals.
//!
//! The theme publishes `window.theme` (strings, customer id, wishlist
//! settings) and Shopify publishes `window.Shopify` (locale, active
//! currency). Either may be missing.

use serde::de::DeserializeOwned;
use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::Window;
use wishlist_engine::WishlistConfig;
use wishlist_engine::config::{ShopSettings, ThemeSettings};

/// Errors reading the page's settings globals.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid window.{global}: {source}")]
    Invalid {
        global: &'static str,
        #[source]
        source: serde_wasm_bindgen::Error,
    },
}

/// Resolve the configuration from `window.theme` and `window.Shopify`.
///
/// # Errors
///
/// Returns `SettingsError` if a global exists but has the wrong shape.
pub fn read(window: &Window) -> Result<WishlistConfig, SettingsError> {
    let theme: ThemeSettings = global(window, "theme")?;
    let shop: ShopSettings = global(window, "Shopify")?;
    Ok(WishlistConfig::resolve(theme, shop))
}

fn global<T: DeserializeOwned + Default>(
    window: &Window,
    name: &'static str,
) -> Result<T, SettingsError> {
    let value = js_sys::Reflect::get(window, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED);
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }

    serde_wasm_bindgen::from_value(value).map_err(|source| SettingsError::Invalid {
        global: name,
        source,
    })
}
