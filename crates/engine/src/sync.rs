//! Badge and label synchronization.
//!
//! Every pass re-scans the whole document rather than touching only the
//! control that triggered it: one product can be shown by several buttons
//! (grid, quick view, recommendations), and sections re-rendered by the
//! theme bring fresh, unsynchronized copies.

use crate::button::{ButtonLabels, button_key};
use crate::config::{Labels, with_override};
use crate::dom::{Page, attrs, classes, selectors};
use crate::storage::Storage;
use crate::store::FavoriteStore;

/// A favorite button whose active state flipped during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange<E> {
    pub button: E,
    pub is_favorite: bool,
}

/// Update the count badge, its wrapper's visibility and the header icons.
pub fn update_count<P: Page>(page: &P, count: usize) {
    let empty = count == 0;
    let wrapper = page.query(selectors::COUNT_WRAPPER);

    if let Some(badge) = page.query(selectors::COUNT) {
        page.set_text_content(&badge, &count.to_string());
        if wrapper.is_none() {
            page.toggle_class(&badge, classes::HIDDEN, empty);
        }
    }
    if let Some(wrapper) = wrapper {
        page.toggle_class(&wrapper, classes::HIDDEN, empty);
    }

    for icon in page.query_all(selectors::HEADER_ICON) {
        page.toggle_class(&icon, classes::IS_ACTIVE, !empty);
        page.set_attribute(&icon, attrs::ARIA_PRESSED, bool_attr(!empty));
    }
}

/// Relabel every drawer toggle for the current count and drawer state.
///
/// Closed toggles read "<open label> (<count>)" when there are favorites.
pub fn update_drawer_toggles<P: Page>(page: &P, labels: &Labels, count: usize, open: bool) {
    for toggle in page.query_all(selectors::TOGGLE) {
        let label = if open {
            with_override(page.attribute(&toggle, attrs::CLOSE_LABEL), &labels.close_wishlist)
        } else {
            let base = with_override(page.attribute(&toggle, attrs::OPEN_LABEL), &labels.open_wishlist);
            if count > 0 {
                format!("{base} ({count})")
            } else {
                base
            }
        };
        page.set_attribute(&toggle, attrs::ARIA_LABEL, &label);
        page.set_attribute(&toggle, attrs::ARIA_EXPANDED, bool_attr(open));
    }
}

/// Bring every favorite button in the document in line with the store.
///
/// Returns the buttons whose state flipped, for the caller to animate.
pub fn sync_favorite_buttons<P: Page, S: Storage>(
    page: &P,
    store: &FavoriteStore<S>,
    labels: &Labels,
) -> Vec<StateChange<P::Element>> {
    let mut changes = Vec::new();

    for button in page.query_all(selectors::BUTTON) {
        let is_favorite =
            button_key(page, &button).is_some_and(|key| store.contains(key.as_str()));
        let was_favorite = page.has_class(&button, classes::IS_ACTIVE);

        apply_button_state(page, &button, is_favorite, labels);

        if was_favorite != is_favorite {
            changes.push(StateChange {
                button,
                is_favorite,
            });
        }
    }

    changes
}

/// Set one button's active class, pressed state and label.
pub fn apply_button_state<P: Page>(
    page: &P,
    button: &P::Element,
    is_favorite: bool,
    labels: &Labels,
) {
    let labels = ButtonLabels::resolve(page, button, labels);
    let label = labels.for_state(is_favorite);

    page.toggle_class(button, classes::IS_ACTIVE, is_favorite);
    page.set_attribute(button, attrs::ARIA_PRESSED, bool_attr(is_favorite));
    page.set_attribute(button, attrs::ARIA_LABEL, label);

    for target in page.query_within(button, selectors::LABEL_TARGET) {
        page.set_text_content(&target, label);
    }
}

const fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
