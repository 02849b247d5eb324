//! Wishlist Core - Shared types library.
//!
//! This crate provides the types shared by the favorites engine and its hosts:
//! - `engine` - The favorites synchronization engine (store, rendering, sync)
//! - `wasm` - Browser bindings that drive the engine from the live DOM
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no DOM.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids, prices and favorite entries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
