//! Page abstraction the engine renders through.
//!
//! The engine never calls a browser API. A host implements [`Page`] over its
//! element type (a `web_sys::Element` in the browser, an arena node id in
//! tests) and feeds user input back as [`crate::Event`]s. The markup contract
//! is given by the storefront theme and listed in [`selectors`], [`attrs`]
//! and [`classes`].

use std::fmt;
use std::time::Duration;

use wishlist_core::EntryKey;

use crate::events::Listener;

/// Selectors for the theme's wishlist markup.
pub mod selectors {
    /// Drawer container.
    pub const DRAWER: &str = "[data-wishlist-drawer]";
    /// Focusable panel inside the drawer.
    pub const PANEL: &str = "[data-wishlist-panel]";
    /// List that receives the drawer rows.
    pub const ITEMS: &str = "[data-wishlist-items]";
    /// Empty-state placeholder inside the drawer.
    pub const EMPTY: &str = "[data-wishlist-empty]";
    /// Close triggers inside the drawer.
    pub const CLOSE: &str = "[data-wishlist-close]";
    /// Header controls that open and close the drawer.
    pub const TOGGLE: &str = "[data-wishlist-toggle]";
    /// Per-product favorite buttons.
    pub const BUTTON: &str = "[data-wishlist-button]";
    /// Wrapper hidden while the count is zero.
    pub const COUNT_WRAPPER: &str = "[data-wishlist-count-wrapper]";
    /// Numeric count badge.
    pub const COUNT: &str = "[data-wishlist-count]";
    /// Header icon reflecting whether any favorites exist.
    pub const HEADER_ICON: &str = ".header__icon--wishlist";
    /// Optional text node inside a favorite button.
    pub const LABEL_TARGET: &str = "[data-wishlist-label-target]";
    /// Rendered drawer rows.
    pub const ROW: &str = "[data-wishlist-key]";
}

/// Attributes read from and written to the markup.
pub mod attrs {
    pub const PRODUCT_ID: &str = "data-product-id";
    pub const VARIANT_ID: &str = "data-variant-id";
    pub const PRODUCT_TITLE: &str = "data-product-title";
    pub const PRODUCT_URL: &str = "data-product-url";
    pub const PRODUCT_PRICE: &str = "data-product-price";
    pub const PRODUCT_IMAGE: &str = "data-product-image";
    pub const ADD_LABEL: &str = "data-wishlist-add-label";
    pub const ADDED_LABEL: &str = "data-wishlist-added-label";
    pub const OPEN_LABEL: &str = "data-wishlist-open-label";
    pub const CLOSE_LABEL: &str = "data-wishlist-close-label";
    pub const ROW_KEY: &str = "data-wishlist-key";
    pub const ARIA_LABEL: &str = "aria-label";
    pub const ARIA_PRESSED: &str = "aria-pressed";
    pub const ARIA_EXPANDED: &str = "aria-expanded";
    pub const ARIA_HIDDEN: &str = "aria-hidden";
}

/// Classes toggled by the engine.
pub mod classes {
    /// Open drawer.
    pub const DRAWER_ACTIVE: &str = "active";
    /// Body marker while the drawer is open (scroll lock hook).
    pub const BODY_OPEN: &str = "wishlist-open";
    /// Favorite button or header icon in the active state.
    pub const IS_ACTIVE: &str = "is-active";
    pub const HIDDEN: &str = "hidden";
    pub const JUST_ADDED: &str = "wishlist-button--just-added";
    pub const JUST_REMOVED: &str = "wishlist-button--just-removed";
    /// Drawer row playing its exit transition.
    pub const ROW_REMOVING: &str = "wishlist-item--removing";
}

/// Handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Deferred work the engine asks the host to schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timer<E> {
    /// Remove the pulse classes from a favorite button.
    EndPulse(E),
    /// Detach a drawer row whose exit transition never reported back.
    DetachRow(E),
}

/// View model for one drawer row.
///
/// The host builds the row markup (`li.wishlist-item` with media, title
/// link, price and the two actions) and registers
/// [`Listener::ViewProduct`] and [`Listener::RemoveProduct`] on the actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawerRow {
    pub key: EntryKey,
    pub title: String,
    pub url: String,
    pub price: String,
    pub image: Option<String>,
    pub view_label: String,
    pub remove_label: String,
}

/// The document as the engine sees it.
///
/// All methods take `&self`: hosts wrap inherently shared, single-threaded
/// resources (the DOM, an `Rc<RefCell<_>>` arena).
pub trait Page {
    /// Element handle; equality is element identity.
    type Element: Clone + PartialEq + fmt::Debug;

    /// First element in the document matching `selector`.
    fn query(&self, selector: &str) -> Option<Self::Element>;

    /// Every element in the document matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Descendants of `root` matching `selector`, in document order.
    fn query_within(&self, root: &Self::Element, selector: &str) -> Vec<Self::Element>;

    /// Whether `element` itself matches `selector`.
    fn matches(&self, element: &Self::Element, selector: &str) -> bool;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    /// Add (`on == true`) or remove a class.
    fn toggle_class(&self, element: &Self::Element, class: &str, on: bool);

    fn text_content(&self, element: &Self::Element) -> String;

    fn set_text_content(&self, element: &Self::Element, text: &str);

    /// Add or remove a class on the document body.
    fn set_body_class(&self, class: &str, on: bool);

    /// Re-parent `element` to the body unless it is already a direct child.
    fn move_to_body(&self, element: &Self::Element);

    fn focus(&self, element: &Self::Element);

    /// Force style recalculation so a re-added class restarts its animation.
    fn force_reflow(&self, element: &Self::Element);

    /// Whether `element` is still in the document.
    fn is_attached(&self, element: &Self::Element) -> bool;

    /// Remove `element` from the document.
    fn detach(&self, element: &Self::Element);

    /// Clear `list` and build one row per view model.
    fn render_rows(&self, list: &Self::Element, rows: &[DrawerRow]);

    /// Attach a listener; the host reports it back as [`Listener::event`].
    fn listen(&self, element: &Self::Element, listener: Listener);

    /// Whether this host currently holds `listener` on `element`.
    ///
    /// Markup copied from a bound element (`cloneNode`) is not bound, and an
    /// element whose listener the host released is not bound either.
    fn is_bound(&self, element: &Self::Element, listener: &Listener) -> bool;

    fn navigate(&self, url: &str);

    /// Schedule `timer` to be delivered as an event after `delay`.
    fn set_timeout(&self, delay: Duration, timer: Timer<Self::Element>) -> TimerId;

    /// Cancel a scheduled timer. Cancelling a fired timer is a no-op.
    fn clear_timeout(&self, id: TimerId);
}
