//! Typed access to a document collection.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use storefront_core::Document;

use crate::error::StoreError;
use crate::query::{Filter, FindOptions};
use crate::source::DocumentStore;

/// A typed view over the collection named by `T::COLLECTION`.
///
/// Converts between `T` and JSON at the boundary so handlers never touch raw
/// documents.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub async fn insert(&self, document: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(document)?;
        self.store.insert(T::COLLECTION, document.id(), value).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        self.find_with(filter, &FindOptions::new()).await
    }

    pub async fn find_with(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<T>, StoreError> {
        self.store
            .find(T::COLLECTION, filter, options)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        let mut found = self
            .find_with(filter, &FindOptions::new().limit(1))
            .await?;
        Ok(found.pop())
    }

    pub async fn all(&self) -> Result<Vec<T>, StoreError> {
        self.find(&Filter::all()).await
    }

    pub async fn count(&self, filter: &Filter) -> Result<usize, StoreError> {
        self.store.count(T::COLLECTION, filter).await
    }

    /// Distinct string values of `field`; non-string values are skipped.
    pub async fn distinct_strings(&self, field: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .store
            .distinct(T::COLLECTION, field)
            .await?
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    /// Writes back an existing document.
    ///
    /// # Errors
    ///
    /// - `StoreError::Missing` if the document was deleted in the meantime
    pub async fn save(&self, document: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(document)?;
        if self
            .store
            .replace(T::COLLECTION, document.id(), value)
            .await?
        {
            Ok(())
        } else {
            Err(StoreError::Missing {
                collection: T::COLLECTION.to_string(),
                id: document.id().to_string(),
            })
        }
    }

    /// Deletes by id. Returns false when nothing was deleted.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }
}

fn decode<T: Document>(value: Value) -> Result<T, StoreError> {
    Ok(serde_json::from_value(value)?)
}
