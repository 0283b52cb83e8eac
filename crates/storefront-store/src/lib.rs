//! # Storefront Store
//!
//! Persistence collaborators for the Storefront backend.
//!
//! ## Features
//!
//! - Object safe async `DocumentStore` trait over JSON documents
//! - Typed `Collection<T>` access for any `storefront_core::Document`
//! - Filter and paging model shared by every store implementation
//! - `ObjectStore` for product photos, backed by the local filesystem
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use storefront_core::Product;
//! use storefront_store::{Collection, Filter, MemoryStore};
//!
//! let products: Collection<Product> = Collection::new(Arc::new(MemoryStore::new()));
//! let lighting = products.find(&Filter::all().eq("category", "lighting")).await?;
//! ```

pub mod collection;
pub mod error;
pub mod memory;
pub mod object;
pub mod query;
pub mod source;

// Re-exports
pub use collection::Collection;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use object::{LocalObjectStore, MemoryObjectStore, ObjectStore, StoredObject, Upload};
pub use query::{Condition, Filter, FindOptions, SortOrder};
pub use source::DocumentStore;
