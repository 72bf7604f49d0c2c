//! In-memory storage implementation of the document backend.
//!
//! Documents live in nested HashMaps behind an async-aware read-write lock.
//! Scans are linear; for small to medium datasets this is acceptable, larger
//! deployments should use a persistent backend.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, Document, Uuid, doc};
use mea::rwlock::RwLock;

use modelkit_core::{
    backend::{BackendBuilder, DocumentBackend, ID_KEY, SearchOptions},
    error::StoreResult,
};

use crate::{
    evaluator::{compare_documents, matches_filter},
    pipeline::execute_pipeline,
};

type CollectionMap = HashMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document storage backend.
///
/// `MemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so
/// multiple clones of the same instance share the same underlying data.
/// Results are returned in ascending identifier order unless a sort is given,
/// keeping scans deterministic despite the HashMap storage.
///
/// # Example
///
/// ```ignore
/// use modelkit_memory::MemoryStore;
/// use modelkit_core::backend::{DocumentBackend, SearchOptions};
/// use bson::doc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStore::new();
///
///     let id = store.insert_document("users", doc! { "name": "Alice" }).await?;
///     let found = store
///         .find_documents("users", doc! { "name": "Alice" }, SearchOptions::default())
///         .await?;
///     assert_eq!(found.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct MemoryStore {
    /// The main storage map: collection_name -> (document_id -> document)
    store: Arc<RwLock<StoreMap>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self { store: Arc::new(RwLock::new(StoreMap::new())) }
    }

    /// Creates a builder for constructing a `MemoryStore`.
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder
    }

    /// Collects the documents of `collection` matching `filter`, sorted by
    /// `sort` or by ascending identifier when no sort is given.
    fn collect_matches(
        collection: Option<&CollectionMap>,
        filter: &Document,
        sort: Option<&Document>,
    ) -> StoreResult<Vec<Document>> {
        let Some(collection) = collection else {
            return Ok(Vec::new());
        };

        let mut keys = collection.keys().collect::<Vec<_>>();
        keys.sort();

        let mut matches = Vec::new();
        for key in keys {
            let document = &collection[key];
            if matches_filter(document, filter)? {
                matches.push(document.clone());
            }
        }

        if let Some(sort) = sort.filter(|sort| !sort.is_empty()) {
            matches.sort_by(|a, b| compare_documents(a, b, sort));
        }

        Ok(matches)
    }

    fn first_match_key(
        collection: &CollectionMap,
        filter: &Document,
    ) -> StoreResult<Option<String>> {
        let mut keys = collection.keys().collect::<Vec<_>>();
        keys.sort();

        for key in keys {
            if matches_filter(&collection[key], filter)? {
                return Ok(Some(key.clone()));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl DocumentBackend for MemoryStore {
    async fn count_documents(&self, collection: &str, filter: Document) -> StoreResult<u64> {
        let store = self.store.read().await;
        let Some(collection) = store.get(collection) else {
            return Ok(0);
        };

        let mut count = 0;
        for document in collection.values() {
            if matches_filter(document, &filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn find_documents(
        &self,
        collection: &str,
        filter: Document,
        options: SearchOptions,
    ) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let matches =
            Self::collect_matches(store.get(collection), &filter, options.sort.as_ref())?;

        let limit = if options.limit <= 0 { usize::MAX } else { options.limit as usize };

        Ok(matches
            .into_iter()
            .skip(options.skip as usize)
            .take(limit)
            .collect())
    }

    async fn find_one_document(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> StoreResult<Option<Document>> {
        let store = self.store.read().await;
        let matches = Self::collect_matches(store.get(collection), &filter, sort.as_ref())?;

        Ok(matches.into_iter().next())
    }

    async fn insert_document(&self, collection: &str, mut document: Document) -> StoreResult<Bson> {
        let mut store = self.store.write().await;
        let collection_map = store.entry(collection.to_string()).or_default();

        let key = Uuid::new().to_string();
        let id = Bson::String(key.clone());
        document.insert(ID_KEY, id.clone());
        collection_map.insert(key, document);

        Ok(id)
    }

    async fn update_one_document(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(0);
        };

        let Some(key) = Self::first_match_key(collection_map, &filter)? else {
            return Ok(0);
        };

        if let Some(fields) = update.get("$set").and_then(Bson::as_document)
            && let Some(document) = collection_map.get_mut(&key)
        {
            for (field, value) in fields {
                document.insert(field, value.clone());
            }
        }

        Ok(1)
    }

    async fn replace_one_document(
        &self,
        collection: &str,
        filter: Document,
        mut replacement: Document,
    ) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(0);
        };

        let Some(key) = Self::first_match_key(collection_map, &filter)? else {
            return Ok(0);
        };

        let existing_id = collection_map[&key].get(ID_KEY).cloned();
        if let Some(id) = existing_id {
            replacement.insert(ID_KEY, id);
        }
        collection_map.insert(key, replacement);

        Ok(1)
    }

    async fn delete_one_document(&self, collection: &str, filter: Document) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(0);
        };

        let Some(key) = Self::first_match_key(collection_map, &filter)? else {
            return Ok(0);
        };

        collection_map.remove(&key);
        Ok(1)
    }

    async fn aggregate_documents(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let documents =
            Self::collect_matches(store.get(collection), &Document::new(), None)?;

        execute_pipeline(documents, &pipeline)
    }
}

/// Builder for constructing [`MemoryStore`] instances.
#[derive(Default)]
pub struct MemoryStoreBuilder;

#[async_trait]
impl BackendBuilder for MemoryStoreBuilder {
    type Backend = MemoryStore;

    /// Builds and returns a new [`MemoryStore`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MemoryStore::new())
    }
}
