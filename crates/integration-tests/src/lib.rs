//! End-to-end tests for the wishlist engine.
//!
//! The tests mount a [`Wishlist`] on the in-memory storefront page from
//! `wishlist_engine::testing` and drive it only through what a browser host
//! would deliver: clicks, key presses, timers and observed insertions, plus
//! the Facade API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p wishlist-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `facade` - programmatic add/remove/toggle/list scenarios
//! - `storage` - persistence, scoping and legacy migration
//! - `dom_sync` - clicks, drawer, badge and discovery of new markup

use wishlist_engine::storage::MemoryStorage;
use wishlist_engine::testing::{MemoryPage, NodeId, StorefrontFixture};
use wishlist_engine::{Event, Wishlist, WishlistConfig};

/// A wishlist mounted on the in-memory page.
pub type TestWishlist = Wishlist<MemoryPage, MemoryStorage>;

/// Configuration with US formatting, so expected prices read naturally.
#[must_use]
pub fn us_config() -> WishlistConfig {
    WishlistConfig {
        locale: "en-US".to_string(),
        currency: "USD".to_string(),
        ..WishlistConfig::default()
    }
}

/// Mount a wishlist on a page carrying the storefront fixture.
///
/// # Panics
///
/// Panics if the page lacks the drawer markup.
#[must_use]
pub fn mount(page: &MemoryPage, storage: &MemoryStorage) -> TestWishlist {
    Wishlist::mount(page.clone(), storage.clone(), us_config())
        .expect("storefront fixture has the drawer markup")
}

/// Build the storefront fixture and mount a wishlist on it.
///
/// # Panics
///
/// Panics if mounting fails, which the fixture's markup rules out.
#[must_use]
pub fn storefront(storage: &MemoryStorage) -> (MemoryPage, StorefrontFixture, TestWishlist) {
    let (page, fixture) = StorefrontFixture::build();
    let wishlist = mount(&page, storage);
    (page, fixture, wishlist)
}

/// Feed host events to the wishlist in order.
pub fn dispatch(wishlist: &mut TestWishlist, events: Vec<Event<NodeId>>) {
    for event in events {
        wishlist.handle(event);
    }
}
