//! Wishlist engine library.
//!
//! The favorites synchronization engine: a single in-memory source of truth
//! for the shopper's favorites, its local persistence contract, and the
//! protocol that keeps every visual surface (per-product toggle buttons, the
//! header count badge, the slide-out drawer) consistent with it.
//!
//! # Architecture
//!
//! - [`store::FavoriteStore`] owns the ordered, key-unique collection and
//!   persists it through a [`storage::Storage`] after every mutation
//! - The engine never touches a browser API. Hosts implement [`dom::Page`]
//!   and translate browser callbacks into [`events::Event`]s
//! - [`Wishlist`] is the only entry point: it mounts against a page, handles
//!   events, and exposes the external Facade (`add`, `remove`, `toggle`,
//!   `list`, `open`, `close`)
//!
//! After every mutation the engine runs the same cascade: persist, badge and
//! label sync, drawer render, button state sync with animations.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod animation;
pub mod button;
pub mod config;
pub mod dom;
pub mod drawer;
pub mod engine;
pub mod error;
pub mod events;
mod facade;
pub mod format;
pub mod storage;
pub mod store;
pub mod sync;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::WishlistConfig;
pub use engine::Wishlist;
pub use error::{Result, WishlistError};
pub use events::{Event, Listener};
pub use storage::{ShopperIdentity, Storage, StorageError};
pub use store::{FavoriteStore, Toggled};
