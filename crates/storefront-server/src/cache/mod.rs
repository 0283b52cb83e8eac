//! Cache layer for the Storefront server.
//!
//! This module provides the key store abstraction (in-process Moka or Redis),
//! read-through population for list and detail reads, and tag-based
//! invalidation for writes.

pub mod error;
pub mod invalidation;
pub mod key_store;
pub mod keys;
pub mod read_through;

// Re-exports
pub use error::CacheError;
pub use invalidation::{InvalidationRequest, InvalidationResult, InvalidationRouter};
pub use key_store::{KeyStore, MemoryKeyStore, RedisKeyStore, build_key_store};
pub use keys::{CacheKey, SearchKey};
pub use read_through::{PopulateMode, ReadThrough};
