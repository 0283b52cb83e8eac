//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::query::{Filter, FindOptions};
use crate::source::DocumentStore;

type Collections = HashMap<String, IndexMap<String, Value>>;

/// A document store held entirely in memory.
///
/// Each collection keeps insertion order, so unsorted queries return documents
/// in the order they were created.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, IndexMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn matching(&self, collection: &str, filter: &Filter) -> Vec<Value> {
        let guard = self.collections.read();
        guard
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    #[instrument(skip(self, document), fields(store = "memory"))]
    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let mut guard = self.collections.write();
        let docs = guard.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        docs.insert(id.to_string(), document);
        debug!(count = docs.len(), "Inserted document");
        Ok(())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(options.apply(self.matching(collection, filter)))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize, StoreError> {
        let guard = self.collections.read();
        Ok(guard
            .get(collection)
            .map_or(0, |docs| docs.values().filter(|d| filter.matches(d)).count()))
    }

    #[instrument(skip(self, document), fields(store = "memory"))]
    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<bool, StoreError> {
        let mut guard = self.collections.write();
        match guard.get_mut(collection).and_then(|docs| docs.get_mut(id)) {
            Some(slot) => {
                *slot = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self), fields(store = "memory"))]
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut guard = self.collections.write();
        Ok(guard
            .get_mut(collection)
            .and_then(|docs| docs.shift_remove(id))
            .is_some())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
