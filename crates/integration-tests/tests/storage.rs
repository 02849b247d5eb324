//! Persistence, per-shopper scoping and legacy key migration.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use wishlist_core::{FavoriteInput, Price};
use wishlist_engine::storage::{LEGACY_STORAGE_KEY, MemoryStorage, ShopperIdentity};
use wishlist_engine::testing::StorefrontFixture;
use wishlist_engine::{Wishlist, WishlistConfig};
use wishlist_integration_tests::{storefront, us_config};

const GUEST_KEY: &str = "wishlist:guest";

fn customer(token: &str) -> WishlistConfig {
    WishlistConfig {
        identity: ShopperIdentity::Customer(SecretString::from(token)),
        ..us_config()
    }
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_favorites_survive_a_reload() {
    let storage = MemoryStorage::new();
    let (_page, _fixture, mut first) = storefront(&storage);
    first.add(
        FavoriteInput::new("7")
            .variant("70")
            .title("Shirt")
            .url("/p/7")
            .price(Price::from_minor_units(2550))
            .image("https://cdn.example/shirt.jpg"),
    );
    first.add(FavoriteInput::new("8").title("Hat"));

    let (_page, _fixture, second) = storefront(&storage);
    assert_eq!(second.list(), first.list());
}

#[test]
fn test_persisted_layout() {
    let storage = MemoryStorage::new();
    let (_page, _fixture, mut wishlist) = storefront(&storage);
    wishlist.add(FavoriteInput::new("7").title("Shirt").price(Price::from_minor_units(2550)));

    let raw: serde_json::Value = serde_json::from_str(&storage.peek(GUEST_KEY).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!([{
            "id": "7",
            "variantId": "7",
            "title": "Shirt",
            "url": "#",
            "price": 25.5,
            "image": ""
        }])
    );
}

// =============================================================================
// Malformed storage
// =============================================================================

#[test]
fn test_malformed_storage_yields_empty_list() {
    for raw in ["not json", "{\"id\": \"1\"}", "42", "null"] {
        let storage = MemoryStorage::new().with_item(GUEST_KEY, raw);
        let (_page, fixture, wishlist) = storefront(&storage);
        assert!(wishlist.list().is_empty(), "{raw}");
        assert!(wishlist.page().drawer_rows(&fixture.items).is_empty());
    }
}

#[test]
fn test_throwing_storage_keeps_the_page_working() {
    let storage = MemoryStorage::new();
    storage.set_fail_reads(true);
    storage.set_fail_writes(true);

    let (_page, _fixture, mut wishlist) = storefront(&storage);
    assert!(wishlist.add(FavoriteInput::new("1")));
    assert_eq!(wishlist.list().len(), 1);
    assert!(storage.keys().is_empty());
}

// =============================================================================
// Scoping and migration
// =============================================================================

#[test]
fn test_customer_migration_moves_legacy_list() {
    let storage =
        MemoryStorage::new().with_item(LEGACY_STORAGE_KEY, r#"[{"id": "5", "title": "Mug"}]"#);
    let (page, _fixture) = StorefrontFixture::build();

    let wishlist = Wishlist::mount(page, storage.clone(), customer("abc")).unwrap();

    assert_eq!(storage.peek(LEGACY_STORAGE_KEY), None);
    let scoped = storage.peek("wishlist:abc").unwrap();
    assert!(scoped.contains("\"Mug\""));
    assert_eq!(wishlist.list().first().unwrap().title, "Mug");
}

#[test]
fn test_migration_never_overwrites_existing_customer_list() {
    let storage = MemoryStorage::new()
        .with_item(LEGACY_STORAGE_KEY, r#"[{"id": "5"}]"#)
        .with_item("wishlist:abc", r#"[{"id": "6"}]"#);
    let (page, _fixture) = StorefrontFixture::build();

    let wishlist = Wishlist::mount(page, storage.clone(), customer("abc")).unwrap();

    let keys: Vec<String> = wishlist.list().iter().map(|e| e.key().to_string()).collect();
    assert_eq!(keys, vec!["6".to_string()]);
    assert!(storage.peek(LEGACY_STORAGE_KEY).is_some());
}

#[test]
fn test_guests_do_not_migrate() {
    let storage = MemoryStorage::new().with_item(LEGACY_STORAGE_KEY, r#"[{"id": "5"}]"#);
    let (_page, _fixture, wishlist) = storefront(&storage);

    assert!(wishlist.list().is_empty());
    assert!(storage.peek(LEGACY_STORAGE_KEY).is_some());
}

#[test]
fn test_scopes_are_isolated() {
    let storage = MemoryStorage::new();
    let (page, _fixture) = StorefrontFixture::build();
    let mut alice = Wishlist::mount(page, storage.clone(), customer("alice")).unwrap();
    alice.add(FavoriteInput::new("1"));

    let (page, _fixture) = StorefrontFixture::build();
    let bob = Wishlist::mount(page, storage.clone(), customer("bob")).unwrap();
    let (_page, _fixture, guest) = storefront(&storage);

    assert!(bob.list().is_empty());
    assert!(guest.list().is_empty());
    assert!(storage.peek("wishlist:alice").is_some());
}

#[test]
fn test_identity_debug_redacts_token() {
    let identity = ShopperIdentity::Customer(SecretString::from("abc"));
    let debug = format!("{identity:?}");
    assert!(!debug.contains("abc"));
}
