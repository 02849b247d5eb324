//! Wishlist configuration resolved from theme and shop settings.
//!
//! # Sources
//!
//! The storefront exposes two JSON-shaped objects to page scripts:
//!
//! - `window.theme` - [`ThemeSettings`]: translated `strings`, the signed-in
//!   `customerId`, and an optional `wishlist` tuning block
//! - `window.Shopify` - [`ShopSettings`]: active `locale` and `currency`
//!
//! # Precedence
//!
//! Every label resolves element attribute → theme string → built-in default.
//! Blank values at any level fall through to the next one. Element-level
//! overrides are read at sync time with [`with_override`]; the other two
//! levels are merged here, once, at mount.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use wishlist_core::CustomerId;

use crate::storage::ShopperIdentity;

/// Locale used when the shop does not report one.
pub const DEFAULT_LOCALE: &str = "es-CO";

/// Currency used when the shop does not report one.
pub const DEFAULT_CURRENCY: &str = "COP";

/// Tracing filter used when the theme does not set `wishlist.logLevel`.
pub const DEFAULT_LOG_FILTER: &str = "wishlist_engine=info,wishlist_wasm=info";

const DEFAULT_ADDED_PULSE_MS: u64 = 700;
const DEFAULT_REMOVED_PULSE_MS: u64 = 400;
const DEFAULT_ROW_EXIT_MS: u64 = 400;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid theme settings: {0}")]
    Theme(#[source] serde_json::Error),
    #[error("Invalid shop settings: {0}")]
    Shop(#[source] serde_json::Error),
}

/// Resolved wishlist configuration.
#[derive(Debug, Clone)]
pub struct WishlistConfig {
    /// User-visible strings.
    pub labels: Labels,
    /// Pulse and row-exit timings.
    pub animation: AnimationConfig,
    /// BCP 47 locale used for money formatting.
    pub locale: String,
    /// ISO 4217 code used for money formatting.
    pub currency: String,
    /// Whose favorites these are; selects the storage scope.
    pub identity: ShopperIdentity,
    /// Tracing filter directive for hosts that install a subscriber.
    pub log_filter: String,
}

impl Default for WishlistConfig {
    fn default() -> Self {
        Self::resolve(ThemeSettings::default(), ShopSettings::default())
    }
}

impl WishlistConfig {
    /// Merge theme and shop settings over the built-in defaults.
    #[must_use]
    pub fn resolve(theme: ThemeSettings, shop: ShopSettings) -> Self {
        let settings = theme.wishlist;
        let defaults = AnimationConfig::default();

        Self {
            labels: Labels::default().merged(theme.strings),
            animation: AnimationConfig {
                added: settings
                    .added_animation_ms
                    .map_or(defaults.added, Duration::from_millis),
                removed: settings
                    .removed_animation_ms
                    .map_or(defaults.removed, Duration::from_millis),
                row_exit: settings
                    .row_exit_ms
                    .map_or(defaults.row_exit, Duration::from_millis),
            },
            locale: non_blank(shop.locale).unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            currency: non_blank(shop.currency.and_then(|c| c.active))
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            identity: ShopperIdentity::from_customer_id(theme.customer_id),
            log_filter: non_blank(settings.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Parse the JSON forms of the theme and shop settings.
    ///
    /// Blank input is treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either document is not valid JSON of the
    /// expected shape.
    pub fn from_json(theme: &str, shop: &str) -> Result<Self, ConfigError> {
        let theme: ThemeSettings = if theme.trim().is_empty() {
            ThemeSettings::default()
        } else {
            serde_json::from_str(theme).map_err(ConfigError::Theme)?
        };
        let shop: ShopSettings = if shop.trim().is_empty() {
            ShopSettings::default()
        } else {
            serde_json::from_str(shop).map_err(ConfigError::Shop)?
        };
        Ok(Self::resolve(theme, shop))
    }
}

/// User-visible strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// Drawer toggle label while closed.
    pub open_wishlist: String,
    /// Drawer toggle label while open.
    pub close_wishlist: String,
    /// Product button label when not a favorite.
    pub add_to_wishlist: String,
    /// Product button label when already a favorite.
    pub added_to_wishlist: String,
    /// Drawer row remove action.
    pub remove_from_wishlist: String,
    /// Drawer row view action.
    pub view_product: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            open_wishlist: "Ver favoritos".to_string(),
            close_wishlist: "Cerrar favoritos".to_string(),
            add_to_wishlist: "Agregar a favoritos".to_string(),
            added_to_wishlist: "En favoritos".to_string(),
            remove_from_wishlist: "Quitar de favoritos".to_string(),
            view_product: "Ver producto".to_string(),
        }
    }
}

impl Labels {
    /// Apply theme overrides; blank overrides are ignored.
    #[must_use]
    pub fn merged(self, overrides: LabelOverrides) -> Self {
        Self {
            open_wishlist: non_blank(overrides.open_wishlist).unwrap_or(self.open_wishlist),
            close_wishlist: non_blank(overrides.close_wishlist).unwrap_or(self.close_wishlist),
            add_to_wishlist: non_blank(overrides.add_to_wishlist).unwrap_or(self.add_to_wishlist),
            added_to_wishlist: non_blank(overrides.added_to_wishlist)
                .unwrap_or(self.added_to_wishlist),
            remove_from_wishlist: non_blank(overrides.remove_from_wishlist)
                .unwrap_or(self.remove_from_wishlist),
            view_product: non_blank(overrides.view_product).unwrap_or(self.view_product),
        }
    }
}

/// Resolve an element-level override against the configured label.
#[must_use]
pub fn with_override(element: Option<String>, configured: &str) -> String {
    non_blank(element).unwrap_or_else(|| configured.to_string())
}

/// Pulse and row-exit timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    /// How long the "just added" class stays on a button.
    pub added: Duration,
    /// How long the "just removed" class stays on a button.
    pub removed: Duration,
    /// Fallback delay before an exiting drawer row is detached.
    pub row_exit: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            added: Duration::from_millis(DEFAULT_ADDED_PULSE_MS),
            removed: Duration::from_millis(DEFAULT_REMOVED_PULSE_MS),
            row_exit: Duration::from_millis(DEFAULT_ROW_EXIT_MS),
        }
    }
}

/// `window.theme` as the storefront renders it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    #[serde(default)]
    pub strings: LabelOverrides,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub wishlist: WishlistSettings,
}

/// Translated strings from the theme; the theme may set any subset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOverrides {
    #[serde(default)]
    pub open_wishlist: Option<String>,
    #[serde(default)]
    pub close_wishlist: Option<String>,
    #[serde(default)]
    pub add_to_wishlist: Option<String>,
    #[serde(default)]
    pub added_to_wishlist: Option<String>,
    #[serde(default)]
    pub remove_from_wishlist: Option<String>,
    #[serde(default)]
    pub view_product: Option<String>,
}

/// Optional `theme.wishlist` tuning block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistSettings {
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub added_animation_ms: Option<u64>,
    #[serde(default)]
    pub removed_animation_ms: Option<u64>,
    #[serde(default)]
    pub row_exit_ms: Option<u64>,
}

/// The parts of `window.Shopify` the wishlist reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopSettings {
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub currency: Option<ShopCurrency>,
}

/// `window.Shopify.currency`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopCurrency {
    #[serde(default)]
    pub active: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
