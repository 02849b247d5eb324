//! Favorite button discovery, entry extraction and binding.
//!
//! Favorite buttons are theme markup (`[data-wishlist-button]`) carrying the
//! product's data in attributes. Binding is idempotent: the host tracks the
//! listeners it holds, so discovery can run any number of times (mount,
//! observed insertions, section reloads) without stacking listeners, while
//! cloned or re-inserted markup still gets wired.

use wishlist_core::{EntryKey, FavoriteEntry, FavoriteInput, Price};

use crate::config::{Labels, with_override};
use crate::dom::{Page, attrs, selectors};
use crate::events::Listener;

/// Attach `listener` to `element` unless it is already bound.
///
/// Returns whether a listener was attached.
pub fn bind<P: Page>(page: &P, element: &P::Element, listener: Listener) -> bool {
    if page.is_bound(element, &listener) {
        return false;
    }
    page.listen(element, listener);
    true
}

/// Bind every favorite button currently in the document.
///
/// Returns how many were newly bound.
pub fn bind_favorite_buttons<P: Page>(page: &P) -> usize {
    bind_matching(page, selectors::BUTTON, &Listener::FavoriteButton)
}

/// Bind every header drawer toggle currently in the document.
pub fn bind_drawer_toggles<P: Page>(page: &P) -> usize {
    bind_matching(page, selectors::TOGGLE, &Listener::DrawerToggle)
}

fn bind_matching<P: Page>(page: &P, selector: &str, listener: &Listener) -> usize {
    page.query_all(selector)
        .iter()
        .filter(|element| bind(page, element, listener.clone()))
        .count()
}

/// Whether any of `nodes` is, or contains, an element matching `selector`.
pub fn contains_matching<P: Page>(page: &P, nodes: &[P::Element], selector: &str) -> bool {
    nodes.iter().any(|node| {
        page.matches(node, selector) || !page.query_within(node, selector).is_empty()
    })
}

/// Membership key a favorite button refers to.
pub fn button_key<P: Page>(page: &P, button: &P::Element) -> Option<EntryKey> {
    non_blank_attribute(page, button, attrs::VARIANT_ID)
        .or_else(|| non_blank_attribute(page, button, attrs::PRODUCT_ID))
        .map(EntryKey::from)
}

/// Read the favorite entry a button describes.
///
/// Returns `None` when the button carries no product id. Prices in markup
/// are minor units.
pub fn entry_from_button<P: Page>(page: &P, button: &P::Element) -> Option<FavoriteEntry> {
    let id = non_blank_attribute(page, button, attrs::PRODUCT_ID)?;
    let variant = non_blank_attribute(page, button, attrs::VARIANT_ID).unwrap_or_else(|| id.clone());
    let title = non_blank_attribute(page, button, attrs::PRODUCT_TITLE)
        .unwrap_or_else(|| page.text_content(button).trim().to_string());
    let price = page
        .attribute(button, attrs::PRODUCT_PRICE)
        .map_or(Price::ZERO, |raw| Price::parse_minor_units(&raw));

    let mut input = FavoriteInput::new(id).variant(variant).title(title).price(price);
    input.url = page.attribute(button, attrs::PRODUCT_URL);
    input.image = page.attribute(button, attrs::PRODUCT_IMAGE);
    input.normalize().ok()
}

/// The add/added labels for one button, after element overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonLabels {
    pub add: String,
    pub added: String,
}

impl ButtonLabels {
    /// Resolve labels for `button`: element attribute, then configuration.
    pub fn resolve<P: Page>(page: &P, button: &P::Element, labels: &Labels) -> Self {
        Self {
            add: with_override(page.attribute(button, attrs::ADD_LABEL), &labels.add_to_wishlist),
            added: with_override(
                page.attribute(button, attrs::ADDED_LABEL),
                &labels.added_to_wishlist,
            ),
        }
    }

    /// Label for the given membership state.
    #[must_use]
    pub fn for_state(&self, is_favorite: bool) -> &str {
        if is_favorite { &self.added } else { &self.add }
    }
}

fn non_blank_attribute<P: Page>(page: &P, element: &P::Element, name: &str) -> Option<String> {
    page.attribute(element, name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{MemoryPage, ProductMarkup};

    fn page_with_button(markup: &ProductMarkup) -> (MemoryPage, crate::testing::NodeId) {
        let page = MemoryPage::new();
        let button = page.add_product_button(&page.body(), markup);
        (page, button)
    }

    #[test]
    fn test_entry_from_button_reads_attributes() {
        let (page, button) = page_with_button(
            &ProductMarkup::new("7")
                .variant("70")
                .title("Shirt")
                .url("/p/7")
                .price("2550")
                .image("https://cdn.example/7.jpg"),
        );
        let entry = entry_from_button(&page, &button).unwrap();

        assert_eq!(entry.id.as_str(), "7");
        assert_eq!(entry.key().as_str(), "70");
        assert_eq!(entry.title, "Shirt");
        assert_eq!(entry.url, "/p/7");
        assert_eq!(entry.price, Price::from_minor_units(2550));
        assert_eq!(entry.media(), Some("https://cdn.example/7.jpg"));
    }

    #[test]
    fn test_entry_from_button_fallbacks() {
        let (page, button) = page_with_button(&ProductMarkup::new("7").text("  Plain Tee "));
        let entry = entry_from_button(&page, &button).unwrap();

        assert_eq!(entry.key().as_str(), "7");
        assert_eq!(entry.title, "Plain Tee");
        assert_eq!(entry.url, "#");
        assert_eq!(entry.price, Price::ZERO);
        assert_eq!(entry.media(), None);
    }

    #[test]
    fn test_entry_from_button_requires_product_id() {
        let page = MemoryPage::new();
        let button = page.create_element("button");
        page.set_attribute(&button, "data-wishlist-button", "");
        page.set_attribute(&button, attrs::VARIANT_ID, "70");
        page.append_child(&page.body(), &button);

        assert!(entry_from_button(&page, &button).is_none());
        assert_eq!(button_key(&page, &button).unwrap().as_str(), "70");
    }

    #[test]
    fn test_binding_is_idempotent() {
        let (page, button) = page_with_button(&ProductMarkup::new("7"));
        assert_eq!(bind_favorite_buttons(&page), 1);
        assert_eq!(bind_favorite_buttons(&page), 0);
        assert_eq!(page.listeners(&button), vec![Listener::FavoriteButton]);
    }

    #[test]
    fn test_cloned_button_is_bound_again() {
        let (page, button) = page_with_button(&ProductMarkup::new("7"));
        assert_eq!(bind_favorite_buttons(&page), 1);

        let copy = page.clone_node(&button);
        page.append_child(&page.body(), &copy);
        assert!(page.listeners(&copy).is_empty());

        assert_eq!(bind_favorite_buttons(&page), 1);
        assert_eq!(page.listeners(&copy), vec![Listener::FavoriteButton]);
        assert_eq!(page.listeners(&button), vec![Listener::FavoriteButton]);
    }

    #[test]
    fn test_contains_matching_searches_subtrees() {
        let page = MemoryPage::new();
        let grid = page.create_element("div");
        page.append_child(&page.body(), &grid);
        assert!(!contains_matching(&page, std::slice::from_ref(&grid), selectors::BUTTON));

        let button = page.add_product_button(&grid, &ProductMarkup::new("1"));
        assert!(contains_matching(&page, std::slice::from_ref(&button), selectors::BUTTON));
        assert!(contains_matching(&page, &[grid], selectors::BUTTON));
    }

    #[test]
    fn test_button_labels_prefer_element_override() {
        let (page, button) =
            page_with_button(&ProductMarkup::new("7").labels("Guardar", "Guardado"));
        let labels = ButtonLabels::resolve(&page, &button, &Labels::default());
        assert_eq!(labels.for_state(false), "Guardar");
        assert_eq!(labels.for_state(true), "Guardado");

        let (page, button) = page_with_button(&ProductMarkup::new("8"));
        let labels = ButtonLabels::resolve(&page, &button, &Labels::default());
        assert_eq!(labels.for_state(false), "Agregar a favoritos");
        assert_eq!(labels.for_state(true), "En favoritos");
    }
}
