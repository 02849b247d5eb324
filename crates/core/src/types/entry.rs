//! Favorite entries: the only persisted wishlist entity.
//!
//! [`FavoriteInput`] is the loose shape callers hand over (page scripts,
//! DOM attributes, previously stored JSON). Normalizing it into a
//! [`FavoriteEntry`] fills the documented fallbacks and refuses input with
//! no identifying key.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::id::{EntryKey, ProductId, VariantId};
use super::price::Price;

/// Navigation target used when an entry has no product URL.
pub const DEFAULT_URL: &str = "#";

/// Errors produced while normalizing favorite input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// Neither a product id nor a variant id was supplied.
    #[error("favorite has no product or variant id")]
    MissingKey,
}

/// A saved reference to a product/variant the shopper marked for later.
///
/// Serialized with the storefront's field names:
/// `id, variantId, title, url, price, image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "FavoriteInput")]
pub struct FavoriteEntry {
    /// Product identifier.
    pub id: ProductId,
    /// Variant identifier (the product id when there is no variant).
    pub variant_id: VariantId,
    /// Display name.
    pub title: String,
    /// Navigation target, `#` when absent.
    pub url: String,
    /// Price in major currency units.
    pub price: Price,
    /// Image URL, empty when the product has no media.
    pub image: String,
}

impl FavoriteEntry {
    /// The membership key of this entry.
    #[must_use]
    pub const fn key(&self) -> &EntryKey {
        &self.variant_id
    }

    /// The image URL, if the entry has one.
    #[must_use]
    pub fn media(&self) -> Option<&str> {
        let image = self.image.trim();
        (!image.is_empty()).then_some(image)
    }

    /// The URL to navigate to, unless it is the `#` placeholder.
    #[must_use]
    pub fn navigation_target(&self) -> Option<&str> {
        let url = self.url.trim();
        (!url.is_empty() && url != DEFAULT_URL).then_some(url)
    }
}

impl TryFrom<FavoriteInput> for FavoriteEntry {
    type Error = EntryError;

    fn try_from(input: FavoriteInput) -> Result<Self, Self::Error> {
        let id = input.id.filter(|id| !id.is_blank());
        let variant_id = input.variant_id.filter(|id| !id.is_blank());

        let (id, variant_id) = match (id, variant_id) {
            (Some(id), Some(variant)) => (id, variant),
            (Some(id), None) => {
                let variant = VariantId::new(id.as_str());
                (id, variant)
            }
            (None, Some(variant)) => (ProductId::new(variant.as_str()), variant),
            (None, None) => return Err(EntryError::MissingKey),
        };

        Ok(Self {
            id,
            variant_id,
            title: input.title.unwrap_or_default(),
            url: input
                .url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
            price: input.price.map(|p| p.0).unwrap_or_default(),
            image: input.image.unwrap_or_default(),
        })
    }
}

/// Loosely-typed favorite as supplied by callers.
///
/// Every field is optional. Prices follow the ingestion rule: JSON numbers
/// are major units, strings are minor units (the storefront's
/// `data-product-price` convention).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteInput {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub price: Option<PriceInput>,
    #[serde(default)]
    pub image: Option<String>,
}

impl FavoriteInput {
    /// Start an input for the given product id.
    #[must_use]
    pub fn new(id: impl Into<ProductId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set the variant id.
    #[must_use]
    pub fn variant(mut self, variant_id: impl Into<VariantId>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    /// Set the display title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the product URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set a price already in major units.
    #[must_use]
    pub const fn price(mut self, price: Price) -> Self {
        self.price = Some(PriceInput(price));
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Normalize into an entry.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::MissingKey`] when neither id is present.
    pub fn normalize(self) -> Result<FavoriteEntry, EntryError> {
        FavoriteEntry::try_from(self)
    }
}

/// A price read at ingestion: numbers are major units, strings minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceInput(pub Price);

impl<'de> Deserialize<'de> for PriceInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceInputVisitor)
    }
}

struct PriceInputVisitor;

impl Visitor<'_> for PriceInputVisitor {
    type Value = PriceInput;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a major-unit number or a minor-unit string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(PriceInput(Price::new(v.into())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(PriceInput(Price::new(v.into())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(PriceInput(Price::from_f64(v).unwrap_or_default()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(PriceInput(Price::parse_minor_units(v)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_falls_back_to_product_id() {
        let entry = FavoriteInput::new("7").normalize().unwrap();
        assert_eq!(entry.key().as_str(), "7");
        assert_eq!(entry.id.as_str(), "7");
    }

    #[test]
    fn test_product_id_falls_back_to_variant() {
        let input = FavoriteInput {
            variant_id: Some(VariantId::new("9")),
            ..FavoriteInput::default()
        };
        let entry = input.normalize().unwrap();
        assert_eq!(entry.id.as_str(), "9");
    }

    #[test]
    fn test_missing_key_is_refused() {
        assert_eq!(
            FavoriteInput::default().normalize(),
            Err(EntryError::MissingKey)
        );
        assert_eq!(
            FavoriteInput::new("  ").normalize(),
            Err(EntryError::MissingKey)
        );
    }

    #[test]
    fn test_url_defaults_to_hash() {
        let entry = FavoriteInput::new("1").url("").normalize().unwrap();
        assert_eq!(entry.url, DEFAULT_URL);
        assert_eq!(entry.navigation_target(), None);
    }

    #[test]
    fn test_media_absent_when_blank() {
        let entry = FavoriteInput::new("1").image(" ").normalize().unwrap();
        assert_eq!(entry.media(), None);
    }

    #[test]
    fn test_json_number_price_is_major_units() {
        let input: FavoriteInput =
            serde_json::from_str(r#"{"id": 7, "price": 25.5}"#).unwrap();
        let entry = input.normalize().unwrap();
        assert_eq!(entry.price, Price::from_minor_units(2550));
        assert_eq!(entry.id.as_str(), "7");
    }

    #[test]
    fn test_json_string_price_is_minor_units() {
        let input: FavoriteInput =
            serde_json::from_str(r#"{"id": "7", "price": "2550"}"#).unwrap();
        assert_eq!(input.normalize().unwrap().price, Price::from_minor_units(2550));
    }

    #[test]
    fn test_entry_serializes_storefront_layout() {
        let entry = FavoriteInput::new("7")
            .variant("70")
            .title("Shirt")
            .url("/p/7")
            .price(Price::from_minor_units(2550))
            .normalize()
            .unwrap();
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "7",
                "variantId": "70",
                "title": "Shirt",
                "url": "/p/7",
                "price": 25.5,
                "image": ""
            })
        );
    }

    #[test]
    fn test_entry_deserialize_applies_fallbacks() {
        let entry: FavoriteEntry = serde_json::from_str(r#"{"id": "3", "title": "Hat"}"#).unwrap();
        assert_eq!(entry.variant_id.as_str(), "3");
        assert_eq!(entry.url, "#");
        assert_eq!(entry.price, Price::ZERO);
    }

    #[test]
    fn test_entry_deserialize_without_key_fails() {
        assert!(serde_json::from_str::<FavoriteEntry>(r#"{"title": "Hat"}"#).is_err());
    }
}
