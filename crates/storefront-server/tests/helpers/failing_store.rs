//! A document store that fails one kind of write on one collection.

use async_trait::async_trait;
use serde_json::Value;
use storefront_store::{DocumentStore, Filter, FindOptions, MemoryStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Insert,
    Delete,
}

/// Wraps a [`MemoryStore`]; every other operation passes through.
pub struct FailingWrites {
    inner: MemoryStore,
    collection: &'static str,
    write: Write,
}

impl FailingWrites {
    pub fn new(collection: &'static str, write: Write) -> Self {
        Self {
            inner: MemoryStore::new(),
            collection,
            write,
        }
    }

    fn check(&self, collection: &str, write: Write) -> Result<(), StoreError> {
        if collection == self.collection && write == self.write {
            return Err(StoreError::unavailable(format!("{collection} offline")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FailingWrites {
    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.check(collection, Write::Insert)?;
        self.inner.insert(collection, id, document).await
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.inner.find_by_id(collection, id).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Value>, StoreError> {
        self.inner.find(collection, filter, options).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError> {
        self.inner.count(collection, filter).await
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<bool, StoreError> {
        self.inner.replace(collection, id, document).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.check(collection, Write::Delete)?;
        self.inner.delete(collection, id).await
    }

    fn name(&self) -> &str {
        "failing-writes"
    }
}
