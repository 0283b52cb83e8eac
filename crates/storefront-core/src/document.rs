//! Persistable document abstraction.

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// A whole-entity snapshot stored in a named collection.
///
/// Documents serialize to JSON objects carrying their id under `_id`.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection holding this kind of document.
    const COLLECTION: &'static str;

    /// Human readable entity name used in error messages.
    const ENTITY: &'static str;

    /// Returns the document id.
    fn id(&self) -> &str;
}

/// Generates a new time-ordered document id.
///
/// # Example
///
/// ```
/// let a = storefront_core::new_id();
/// let b = storefront_core::new_id();
/// assert_eq!(a.len(), 32);
/// assert!(a < b);
/// ```
pub fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}
