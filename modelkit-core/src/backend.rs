//! Storage-access abstraction implemented by concrete backends.
//!
//! A [`DocumentBackend`] exposes raw document operations against named
//! collections. Backends know nothing about typed models, schema versions, or
//! revisions; those concerns live in the repository layer built on top.

use std::fmt::Debug;

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::error::StoreResult;

/// Key under which the store keeps a document's identifier.
pub const ID_KEY: &str = "_id";

/// Skip, limit, and sort parameters for a document search.
///
/// A `limit` of zero means unlimited.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Number of matching documents to skip.
    pub skip: u64,
    /// Maximum number of documents to return; zero for no limit.
    pub limit: i64,
    /// Sort order, mapping field names to `1` (ascending) or `-1` (descending).
    pub sort: Option<Document>,
}

impl SearchOptions {
    pub fn new(skip: u64, limit: i64, sort: Option<Document>) -> Self {
        SearchOptions { skip, limit, sort }
    }
}

/// Raw document operations against named collections.
///
/// Filters use the operator-document convention: `{field: value}` for
/// equality, `{field: {"$gt": v}}` and friends for comparisons. Backends must
/// apply an identical, deterministic interpretation so repositories behave the
/// same regardless of the store behind them.
#[async_trait]
pub trait DocumentBackend: Send + Sync + Debug {
    /// Counts documents in `collection` matching `filter`.
    async fn count_documents(&self, collection: &str, filter: Document) -> StoreResult<u64>;

    /// Finds documents matching `filter`, honoring the skip, limit, and sort
    /// in `options`.
    async fn find_documents(
        &self,
        collection: &str,
        filter: Document,
        options: SearchOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Finds the first document matching `filter`, in `sort` order if given.
    async fn find_one_document(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> StoreResult<Option<Document>>;

    /// Inserts `document` and returns the assigned identifier.
    async fn insert_document(&self, collection: &str, document: Document) -> StoreResult<Bson>;

    /// Applies `update` (an operator document, e.g. `{"$set": {...}}`) to the
    /// first document matching `filter`. Returns the matched count.
    async fn update_one_document(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> StoreResult<u64>;

    /// Replaces the first document matching `filter` with `replacement`.
    /// Returns the matched count.
    async fn replace_one_document(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
    ) -> StoreResult<u64>;

    /// Deletes the first document matching `filter`. Returns the deleted count.
    async fn delete_one_document(&self, collection: &str, filter: Document) -> StoreResult<u64>;

    /// Runs an aggregation `pipeline` against `collection` and collects the
    /// resulting documents.
    async fn aggregate_documents(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> StoreResult<Vec<Document>>;
}

/// Builder for constructing a configured backend instance.
#[async_trait]
pub trait BackendBuilder {
    type Backend: DocumentBackend;

    /// Consumes the builder and produces a ready backend.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StoreError::Initialization`] when the backend
    /// cannot be constructed from the accumulated configuration.
    async fn build(self) -> StoreResult<Self::Backend>;
}
