//! Core types for the wishlist.
//!
//! This module provides type-safe wrappers for the favorites domain.

pub mod entry;
pub mod id;
pub mod price;

pub use entry::{EntryError, FavoriteEntry, FavoriteInput};
pub use id::*;
pub use price::{CurrencyCode, Price};
