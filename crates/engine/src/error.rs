//! Unified error handling for the wishlist engine.
//!
//! Very little is allowed to fail outward: storage faults and malformed
//! caller input are logged and absorbed where they happen. The only error a
//! host ever sees is from [`crate::Wishlist::mount`], when the page lacks the
//! drawer markup and the feature has to stay inert.

use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Engine-level error type.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// A required drawer element is absent from the page.
    #[error("Missing page element: {0}")]
    MissingElement(&'static str),

    /// Persisted storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Theme or shop settings could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The favorites collection could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for `WishlistError`.
pub type Result<T> = std::result::Result<T, WishlistError>;
