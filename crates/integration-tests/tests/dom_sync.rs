//! Clicks, drawer, badge and discovery of markup added after mount.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use wishlist_core::EntryKey;
use wishlist_engine::Event;
use wishlist_engine::dom::{Page, attrs, classes, selectors};
use wishlist_engine::events::ESCAPE_KEY;
use wishlist_engine::storage::MemoryStorage;
use wishlist_engine::testing::{ProductMarkup, StorefrontFixture};
use wishlist_integration_tests::{dispatch, mount, storefront};

fn shirt() -> ProductMarkup {
    ProductMarkup::new("7")
        .variant("70")
        .title("Shirt")
        .url("/products/shirt")
        .price("2550")
}

// =============================================================================
// Badge
// =============================================================================

#[test]
fn test_badge_tracks_count() {
    let (page, fixture, mut wishlist) = storefront(&MemoryStorage::new());
    assert!(page.has_class(&fixture.count_wrapper, classes::HIDDEN));

    let first = page.add_product_button(&fixture.grid, &ProductMarkup::new("1"));
    let second = page.add_product_button(&fixture.grid, &ProductMarkup::new("2"));
    wishlist.handle(Event::NodesInserted(vec![first, second]));

    dispatch(&mut wishlist, page.click(&first));
    dispatch(&mut wishlist, page.click(&second));
    assert_eq!(page.text_content(&fixture.count), "2");
    assert!(!page.has_class(&fixture.count_wrapper, classes::HIDDEN));
    assert!(page.has_class(&fixture.header_icon, classes::IS_ACTIVE));

    dispatch(&mut wishlist, page.click(&first));
    dispatch(&mut wishlist, page.click(&second));
    assert_eq!(page.text_content(&fixture.count), "0");
    assert!(page.has_class(&fixture.count_wrapper, classes::HIDDEN));
    assert_eq!(
        page.attribute(&fixture.header_icon, attrs::ARIA_PRESSED).as_deref(),
        Some("false")
    );
}

// =============================================================================
// Buttons
// =============================================================================

#[test]
fn test_click_syncs_duplicate_buttons_across_sections() {
    let (page, fixture) = StorefrontFixture::build();
    let grid_button = page.add_product_button(&fixture.grid, &shirt());
    let quick_view = page.add_product_button(&fixture.header, &shirt().labels("Guardar", "Guardado"));
    let mut wishlist = mount(&page, &MemoryStorage::new());

    dispatch(&mut wishlist, page.click(&grid_button));

    assert!(page.has_class(&quick_view, classes::IS_ACTIVE));
    assert_eq!(
        page.attribute(&quick_view, attrs::ARIA_LABEL).as_deref(),
        Some("Guardado")
    );
    assert_eq!(
        page.attribute(&grid_button, attrs::ARIA_LABEL).as_deref(),
        Some("En favoritos")
    );
    assert!(wishlist.store().contains("70"));
}

#[test]
fn test_pulse_classes_always_clear() {
    let (page, fixture) = StorefrontFixture::build();
    let button = page.add_product_button(&fixture.grid, &shirt());
    let mut wishlist = mount(&page, &MemoryStorage::new());

    for _ in 0..5 {
        dispatch(&mut wishlist, page.click(&button));
        dispatch(&mut wishlist, page.advance(Duration::from_millis(100)));
    }
    assert!(page.has_class(&button, classes::IS_ACTIVE));
    assert!(page.has_class(&button, classes::JUST_ADDED));
    assert!(!page.has_class(&button, classes::JUST_REMOVED));

    dispatch(&mut wishlist, page.advance(Duration::from_millis(700)));
    assert!(!page.has_class(&button, classes::JUST_ADDED));
    assert!(page.has_class(&button, classes::IS_ACTIVE));
    assert_eq!(page.pending_timers(), 0);
}

#[test]
fn test_observed_buttons_are_bound_once() {
    let (page, fixture, mut wishlist) = storefront(&MemoryStorage::new());

    let section = page.create_element("section");
    let button = page.add_product_button(&section, &shirt());
    page.append_child(&fixture.grid, &section);
    wishlist.handle(Event::NodesInserted(vec![section]));
    wishlist.handle(Event::SectionReloaded);
    wishlist.handle(Event::NodesInserted(vec![section]));

    assert_eq!(page.click(&button).len(), 1);
    dispatch(&mut wishlist, page.click(&button));
    assert!(wishlist.store().contains("70"));
}

#[test]
fn test_cloned_markup_is_wired_on_insertion() {
    let (page, fixture) = StorefrontFixture::build();
    let original = page.add_product_button(&fixture.grid, &shirt());
    let mut wishlist = mount(&page, &MemoryStorage::new());

    // A carousel duplicating its slides copies the markup, not the listener.
    let slide = page.create_element("div");
    page.append_child(&slide, &page.clone_node(&original));
    page.append_child(&fixture.grid, &slide);
    wishlist.handle(Event::NodesInserted(vec![slide]));

    let copy = page.query_within(&slide, selectors::BUTTON).pop().unwrap();
    dispatch(&mut wishlist, page.click(&copy));
    assert!(wishlist.store().contains("70"));
    assert!(page.has_class(&original, classes::IS_ACTIVE));
    assert!(page.has_class(&copy, classes::IS_ACTIVE));
}

#[test]
fn test_reinserted_button_keeps_a_single_listener() {
    let (page, fixture, mut wishlist) = storefront(&MemoryStorage::new());
    let section = page.create_element("section");
    let button = page.add_product_button(&section, &shirt());
    page.append_child(&fixture.grid, &section);
    wishlist.handle(Event::NodesInserted(vec![section]));

    page.detach(&section);
    page.append_child(&fixture.header, &section);
    wishlist.handle(Event::NodesInserted(vec![section]));

    assert_eq!(page.click(&button).len(), 1);
    dispatch(&mut wishlist, page.click(&button));
    assert!(wishlist.store().contains("70"));
}

#[test]
fn test_unrelated_insertions_are_ignored() {
    let (page, fixture, mut wishlist) = storefront(&MemoryStorage::new());

    let text = page.create_element("p");
    page.append_child(&fixture.grid, &text);
    wishlist.handle(Event::NodesInserted(vec![text]));

    // A button that arrived without an insertion notice stays unbound.
    let stray = page.add_product_button(&fixture.grid, &ProductMarkup::new("9"));
    assert!(page.listeners(&stray).is_empty());
}

// =============================================================================
// Drawer
// =============================================================================

#[test]
fn test_drawer_open_close_cycle() {
    let (page, fixture) = StorefrontFixture::build();
    let button = page.add_product_button(&fixture.grid, &shirt());
    let mut wishlist = mount(&page, &MemoryStorage::new());
    dispatch(&mut wishlist, page.click(&button));

    dispatch(&mut wishlist, page.click(&fixture.toggle));
    assert!(wishlist.is_open());
    assert_eq!(
        page.attribute(&fixture.drawer, attrs::ARIA_HIDDEN).as_deref(),
        Some("false")
    );
    assert_eq!(
        page.attribute(&fixture.toggle, attrs::ARIA_EXPANDED).as_deref(),
        Some("true")
    );
    assert_eq!(page.focused(), Some(fixture.panel));

    wishlist.handle(Event::KeyDown(ESCAPE_KEY.to_string()));
    assert!(!wishlist.is_open());
    assert_eq!(
        page.attribute(&fixture.toggle, attrs::ARIA_LABEL).as_deref(),
        Some("Ver favoritos (1)")
    );

    wishlist.handle(Event::KeyDown(ESCAPE_KEY.to_string()));
    dispatch(&mut wishlist, page.click(&fixture.close));
    assert!(!wishlist.is_open());
    assert!(!page.body_has_class(classes::BODY_OPEN));
}

#[test]
fn test_drawer_row_actions() {
    let (page, fixture) = StorefrontFixture::build();
    let shirt_button = page.add_product_button(&fixture.grid, &shirt());
    let hat_button = page.add_product_button(
        &fixture.grid,
        &ProductMarkup::new("8").title("Hat").url("/products/hat").image("https://cdn.example/hat.jpg"),
    );
    let mut wishlist = mount(&page, &MemoryStorage::new());
    dispatch(&mut wishlist, page.click(&shirt_button));
    dispatch(&mut wishlist, page.click(&hat_button));
    dispatch(&mut wishlist, page.advance(Duration::from_millis(700)));
    dispatch(&mut wishlist, page.click(&fixture.toggle));

    let rows = page.drawer_rows(&fixture.items);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.last().unwrap().image.as_deref(), Some("https://cdn.example/hat.jpg"));

    let shirt_row = fixture.row(&page, "70").unwrap();
    dispatch(&mut wishlist, page.click(&page.row_remove_action(&shirt_row).unwrap()));
    assert!(!wishlist.store().contains("70"));
    assert!(!page.has_class(&shirt_button, classes::IS_ACTIVE));
    assert!(page.has_class(&shirt_row, classes::ROW_REMOVING));
    assert_eq!(page.text_content(&fixture.count), "1");

    dispatch(&mut wishlist, page.advance(Duration::from_millis(400)));
    assert!(!page.is_attached(&shirt_row));
    assert_eq!(page.query_within(&fixture.items, selectors::ROW).len(), 1);

    let hat_row = fixture.row(&page, "8").unwrap();
    dispatch(&mut wishlist, page.click(&page.row_view_action(&hat_row).unwrap()));
    assert!(!wishlist.is_open());
    assert_eq!(page.navigations(), vec!["/products/hat".to_string()]);
}

#[test]
fn test_view_product_without_url_only_closes() {
    let (page, _fixture, mut wishlist) = storefront(&MemoryStorage::new());
    wishlist.add(wishlist_core::FavoriteInput::new("3"));
    wishlist.open();

    wishlist.handle(Event::ViewProduct(EntryKey::new("3")));
    assert!(!wishlist.is_open());
    assert!(page.navigations().is_empty());
}

#[test]
fn test_missing_drawer_leaves_page_untouched() {
    let page = wishlist_engine::testing::MemoryPage::new();
    let button = page.add_product_button(&page.body(), &shirt());

    let result = wishlist_engine::Wishlist::mount(
        page.clone(),
        MemoryStorage::new(),
        wishlist_integration_tests::us_config(),
    );

    assert!(result.is_err());
    assert!(page.listeners(&button).is_empty());
    assert!(!page.has_class(&button, classes::IS_ACTIVE));
}
