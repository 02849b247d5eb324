//! Events hosts feed into the engine.
//!
//! Browser callbacks (clicks, key presses, timers, transition ends, observed
//! DOM insertions, theme lifecycle notifications) all become an [`Event`]
//! handled by [`crate::Wishlist::handle`]. Decoupling them from the browser
//! mechanisms is what lets the whole sync protocol run against an in-memory
//! page in tests.

use wishlist_core::EntryKey;

use crate::dom::Timer;

/// Key value that closes the open drawer.
pub const ESCAPE_KEY: &str = "Escape";

/// An input the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<E> {
    /// A per-product favorite button was clicked.
    FavoriteClicked(E),
    /// A header drawer toggle was clicked.
    DrawerToggleClicked,
    /// A close trigger inside the drawer was clicked.
    CloseClicked,
    /// A key was pressed anywhere in the document.
    KeyDown(String),
    /// A drawer row's "view product" action was clicked.
    ViewProduct(EntryKey),
    /// A drawer row's "remove" action was clicked.
    RemoveFromDrawer(EntryKey),
    /// Subtrees were inserted into the document.
    NodesInserted(Vec<E>),
    /// The theme re-rendered a section (`shopify:section:load`).
    SectionReloaded,
    /// A scheduled timer elapsed.
    TimerElapsed(Timer<E>),
    /// A CSS transition on `E` finished.
    TransitionEnd(E),
}

/// Listener kinds the engine asks hosts to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listener {
    /// Click on a per-product favorite button.
    FavoriteButton,
    /// Click on a header drawer toggle.
    DrawerToggle,
    /// Click on a drawer close trigger.
    DrawerClose,
    /// Click on a row's "view product" action.
    ViewProduct(EntryKey),
    /// Click on a row's "remove" action.
    RemoveProduct(EntryKey),
    /// `transitionend` on an exiting drawer row.
    RowTransition,
}

impl Listener {
    /// The event to dispatch when this listener fires on `target`.
    #[must_use]
    pub fn event<E>(&self, target: E) -> Event<E> {
        match self {
            Self::FavoriteButton => Event::FavoriteClicked(target),
            Self::DrawerToggle => Event::DrawerToggleClicked,
            Self::DrawerClose => Event::CloseClicked,
            Self::ViewProduct(key) => Event::ViewProduct(key.clone()),
            Self::RemoveProduct(key) => Event::RemoveFromDrawer(key.clone()),
            Self::RowTransition => Event::TransitionEnd(target),
        }
    }

    /// DOM event type the host should listen for.
    #[must_use]
    pub const fn dom_event(&self) -> &'static str {
        match self {
            Self::RowTransition => "transitionend",
            _ => "click",
        }
    }

    /// Whether the host should suppress the element's default action.
    ///
    /// Close triggers that are anchors keep their navigation; hosts check the
    /// element's tag for [`Listener::DrawerClose`].
    #[must_use]
    pub const fn prevents_default(&self) -> bool {
        !matches!(self, Self::RowTransition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_maps_to_event() {
        assert_eq!(Listener::FavoriteButton.event(3), Event::FavoriteClicked(3));
        assert_eq!(Listener::DrawerToggle.event(3), Event::<i32>::DrawerToggleClicked);
        assert_eq!(
            Listener::RemoveProduct(EntryKey::new("9")).event(3),
            Event::RemoveFromDrawer(EntryKey::new("9"))
        );
        assert_eq!(Listener::RowTransition.event(3), Event::TransitionEnd(3));
    }

    #[test]
    fn test_listener_dom_events() {
        assert_eq!(Listener::RowTransition.dom_event(), "transitionend");
        assert_eq!(Listener::DrawerClose.dom_event(), "click");
        assert!(Listener::FavoriteButton.prevents_default());
        assert!(!Listener::RowTransition.prevents_default());
    }
}
