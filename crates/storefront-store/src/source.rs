//! Document store trait definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::query::{Filter, FindOptions, lookup};

/// A document-oriented persistent store.
///
/// Documents are whole-entity JSON snapshots addressed by collection name and
/// id. The trait is object safe so the server can hold an
/// `Arc<dyn DocumentStore>` and tests can swap in their own implementation.
///
/// # Implementors
///
/// - `MemoryStore` - In-process store backed by insertion-ordered maps
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use storefront_store::{DocumentStore, Filter, FindOptions, MemoryStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), storefront_store::StoreError> {
/// let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
/// store.insert("products", "p-1", json!({"_id": "p-1", "price": 10})).await?;
///
/// let found = store.find("products", &Filter::all(), &FindOptions::new()).await?;
/// assert_eq!(found.len(), 1);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document.
    ///
    /// # Errors
    ///
    /// - `StoreError::Duplicate` if a document with the same id exists
    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    /// Fetches a document by id.
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Returns the documents matching `filter`, ordered and paged by `options`.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Value>, StoreError>;

    /// Counts the documents matching `filter`.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError>;

    /// Replaces an existing document. Returns false when the id is unknown.
    async fn replace(&self, collection: &str, id: &str, document: Value)
    -> Result<bool, StoreError>;

    /// Deletes a document. Returns false when the id is unknown.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Distinct values of `field`, in first-seen order.
    ///
    /// The default implementation scans the whole collection.
    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, StoreError> {
        let documents = self
            .find(collection, &Filter::all(), &FindOptions::new())
            .await?;

        let mut values: Vec<Value> = Vec::new();
        for document in &documents {
            if let Some(value) = lookup(document, field)
                && !values.contains(value)
            {
                values.push(value.clone());
            }
        }
        Ok(values)
    }

    /// Performs a health check on the store.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Returns the name of this store, used for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A read-only store serving a fixed document list.
    struct FixedStore {
        documents: Vec<Value>,
    }

    #[async_trait]
    impl DocumentStore for FixedStore {
        async fn insert(&self, _: &str, _: &str, _: Value) -> Result<(), StoreError> {
            Err(StoreError::unavailable("read only"))
        }

        async fn find_by_id(&self, _: &str, id: &str) -> Result<Option<Value>, StoreError> {
            Ok(self
                .documents
                .iter()
                .find(|d| d["_id"] == id)
                .cloned())
        }

        async fn find(
            &self,
            _: &str,
            filter: &Filter,
            options: &FindOptions,
        ) -> Result<Vec<Value>, StoreError> {
            let matching = self
                .documents
                .iter()
                .filter(|d| filter.matches(d))
                .cloned()
                .collect();
            Ok(options.apply(matching))
        }

        async fn count(&self, _: &str, filter: &Filter) -> Result<usize, StoreError> {
            Ok(self.documents.iter().filter(|d| filter.matches(d)).count())
        }

        async fn replace(&self, _: &str, _: &str, _: Value) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn delete(&self, _: &str, _: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn store() -> FixedStore {
        FixedStore {
            documents: vec![
                json!({"_id": "1", "category": "desk"}),
                json!({"_id": "2", "category": "lamp"}),
                json!({"_id": "3"}),
                json!({"_id": "4", "category": "desk"}),
            ],
        }
    }

    #[tokio::test]
    async fn test_default_distinct_skips_missing_fields() {
        let values = store().distinct("any", "category").await.unwrap();
        assert_eq!(values, vec![json!("desk"), json!("lamp")]);
    }

    #[tokio::test]
    async fn test_default_health_check() {
        let store = store();
        assert!(store.health_check().await.is_ok());
        assert_eq!(store.name(), "fixed");
    }
}
