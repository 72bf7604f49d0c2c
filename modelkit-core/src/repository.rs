//! Paginated search, single-document CRUD, and schema-version migration.
//!
//! A [`Repository`] wraps a [`DocumentBackend`] and layers on the concerns
//! backends deliberately do not know about: page assembly with a count-first
//! short-circuit, schema-version stamping on every write, revision-checked
//! replacement of typed models, and collection migration.

use bson::{Bson, Document, doc};
use tracing::{debug, info, warn};

use crate::{
    backend::{DocumentBackend, ID_KEY, SearchOptions},
    error::{StoreError, StoreResult},
    model::{Model, ModelExt, stored_id_string, stored_id_value},
    page::DocumentPage,
};

/// Key under which every stored document carries its schema-version stamp.
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";
/// Key of the revision counter used for optimistic concurrency.
pub const REVISION_KEY: &str = "revision";

/// A hook applied to documents as they cross the storage boundary.
pub type DocumentMapper = dyn Fn(&mut Document) -> StoreResult<()> + Send + Sync;

/// A per-document transformation applied during migration.
pub type RemapFn = dyn Fn(&Document) -> StoreResult<Document> + Sync;

/// Moves the store's `_id` into the model-facing `id` field as a string.
pub fn id_to_model_mapper(document: &mut Document) -> StoreResult<()> {
    if let Some(id) = document.remove(ID_KEY) {
        document.insert("id", stored_id_string(&id));
    }
    Ok(())
}

/// The storage-access primitive built on a concrete backend.
///
/// Every write path stamps the repository's current schema version onto the
/// document, so a fully written collection needs no migration.
#[derive(Debug)]
pub struct Repository<B: DocumentBackend> {
    backend: B,
    schema_version: Bson,
}

impl<B: DocumentBackend> Repository<B> {
    pub fn new(backend: B, schema_version: impl Into<Bson>) -> Self {
        Repository { backend, schema_version: schema_version.into() }
    }

    /// The backend this repository operates on.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The schema version stamped onto written documents.
    pub fn schema_version(&self) -> &Bson {
        &self.schema_version
    }

    /// Runs a paginated search, returning a page whose `total` is the full
    /// match count.
    ///
    /// Counts first and only issues the find when at least one document
    /// matches; a zero count short-circuits with an empty page. The `mapper`,
    /// if given, is applied to each returned document; a mapper failure fails
    /// the whole search.
    pub async fn search_page(
        &self,
        collection: &str,
        filter: Document,
        options: SearchOptions,
        result_key: &str,
        mapper: Option<&DocumentMapper>,
    ) -> StoreResult<DocumentPage> {
        let offset = options.skip;
        let total = self.backend.count_documents(collection, filter.clone()).await?;

        if total == 0 {
            return Ok(DocumentPage::empty(offset, 0, result_key));
        }

        let mut documents = self.backend.find_documents(collection, filter, options).await?;
        if let Some(mapper) = mapper {
            for document in &mut documents {
                mapper(document)?;
            }
        }

        debug!(collection, total, returned = documents.len(), "page search completed");

        Ok(DocumentPage::new(offset, total, result_key, documents))
    }

    /// Deletes exactly one matching document.
    ///
    /// A delete that affects nothing is itself an error, not a silent
    /// success.
    pub async fn delete_one(&self, collection: &str, filter: Document) -> StoreResult<()> {
        let deleted = self.backend.delete_one_document(collection, filter.clone()).await?;

        if deleted == 0 {
            return Err(StoreError::DocumentNotFound(
                collection.to_string(),
                format!("{filter}"),
            ));
        }

        Ok(())
    }

    /// Merges `update_fields` into the first matching document with `$set`
    /// semantics: null-valued fields are cleared, not removed.
    ///
    /// Fails when `update_fields` is empty or nothing matched. The current
    /// schema version is stamped alongside the caller's fields.
    pub async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        mut update_fields: Document,
    ) -> StoreResult<()> {
        if update_fields.is_empty() {
            return Err(StoreError::InvalidDocument(
                "update requires at least one field".to_string(),
            ));
        }

        update_fields.insert(SCHEMA_VERSION_KEY, self.schema_version.clone());

        let matched = self
            .backend
            .update_one_document(collection, filter.clone(), doc! { "$set": update_fields })
            .await?;

        if matched == 0 {
            return Err(StoreError::DocumentNotFound(
                collection.to_string(),
                format!("{filter}"),
            ));
        }

        Ok(())
    }

    /// Inserts `document`, stamps the schema version, and returns the stored
    /// document with the assigned identifier under [`ID_KEY`].
    ///
    /// Documents that already declare an identifier are rejected; identifiers
    /// are assigned by the store, never by the caller. The `mapper` lets the
    /// model layer rename the identifier key; a mapper failure fails the
    /// whole store.
    pub async fn store_one(
        &self,
        collection: &str,
        mut document: Document,
        mapper: Option<&DocumentMapper>,
    ) -> StoreResult<Document> {
        if document.contains_key(ID_KEY) {
            return Err(StoreError::DocumentAlreadyHasId(collection.to_string()));
        }

        document.insert(SCHEMA_VERSION_KEY, self.schema_version.clone());

        let id = self.backend.insert_document(collection, document.clone()).await?;
        document.insert(ID_KEY, id);

        if let Some(mapper) = mapper {
            mapper(&mut document)?;
        }

        debug!(collection, "document stored");

        Ok(document)
    }

    /// Finds the first document matching `filter` in `sort` order and applies
    /// the `mapper`. Fails when nothing matches.
    pub async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
        mapper: Option<&DocumentMapper>,
    ) -> StoreResult<Document> {
        let mut document = self
            .backend
            .find_one_document(collection, filter.clone(), sort)
            .await?
            .ok_or_else(|| {
                StoreError::DocumentNotFound(collection.to_string(), format!("{filter}"))
            })?;

        if let Some(mapper) = mapper {
            mapper(&mut document)?;
        }

        Ok(document)
    }

    /// Stores a fresh model: revision starts at zero, the store assigns the
    /// identifier, and the stored model is returned with both populated.
    pub async fn store_model<M: Model>(&self, model: &M) -> StoreResult<M> {
        if model.id().is_some() {
            return Err(StoreError::DocumentAlreadyHasId(M::collection_name().to_string()));
        }

        let mut fresh = model.clone();
        fresh.set_revision(0);

        let stored = self.store_one(M::collection_name(), fresh.to_document()?, None).await?;

        M::from_document(stored)
    }

    /// Finds a model by its opaque identifier.
    pub async fn find_model_by_id<M: Model>(&self, id: &str) -> StoreResult<Option<M>> {
        let filter = doc! { ID_KEY: stored_id_value(id) };

        match self.backend.find_one_document(M::collection_name(), filter, None).await? {
            Some(document) => Ok(Some(M::from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Replaces a stored model, guarded by its revision counter.
    ///
    /// The replacement only matches a stored document whose revision equals
    /// the one carried by `model`; a concurrent writer that got there first
    /// surfaces as [`StoreError::Conflict`] instead of being silently
    /// overwritten. On success the returned model carries the incremented
    /// revision.
    pub async fn replace_model<M: Model>(&self, model: &M) -> StoreResult<M> {
        let id = model.id().ok_or_else(|| {
            StoreError::InvalidDocument("cannot replace a model without an identifier".to_string())
        })?;
        let expected = model.revision();

        let mut next = model.clone();
        next.set_revision(expected + 1);

        let id_value = stored_id_value(id);
        let mut document = next.to_document()?;
        document.insert(SCHEMA_VERSION_KEY, self.schema_version.clone());
        document.insert(ID_KEY, id_value.clone());

        let filter = doc! { ID_KEY: id_value.clone(), REVISION_KEY: expected as i64 };
        let matched = self
            .backend
            .replace_one_document(M::collection_name(), filter, document)
            .await?;

        if matched == 0 {
            let exists = self
                .backend
                .find_one_document(M::collection_name(), doc! { ID_KEY: id_value }, None)
                .await?
                .is_some();

            if exists {
                warn!(collection = M::collection_name(), id, "revision check failed");
                return Err(StoreError::Conflict(format!(
                    "{} {id} was modified concurrently (expected revision {expected})",
                    M::model_name(),
                )));
            }

            return Err(StoreError::DocumentNotFound(
                M::collection_name().to_string(),
                format!("_id: {id}"),
            ));
        }

        Ok(next)
    }

    /// Deletes a model by its opaque identifier; fails when nothing matched.
    pub async fn delete_model_by_id<M: Model>(&self, id: &str) -> StoreResult<()> {
        self.delete_one(M::collection_name(), doc! { ID_KEY: stored_id_value(id) })
            .await
    }

    fn needs_migration_filter(&self) -> Document {
        // $ne also matches documents missing the field entirely.
        doc! { SCHEMA_VERSION_KEY: { "$ne": self.schema_version.clone() } }
    }

    /// Migrates every document of `collection` to the canonical shape of `M`.
    ///
    /// Documents whose schema version differs from the current one (in any
    /// legacy representation, or missing entirely) are decoded as `M`,
    /// re-serialized (dropping fields the model no longer defines), stamped,
    /// and replaced in place. A decode failure aborts the migration rather
    /// than silently corrupting unknown shapes. Returns the number of
    /// migrated documents.
    pub async fn migrate_collection<M: Model>(&self, collection: &str) -> StoreResult<u64> {
        let remap = |document: &Document| -> StoreResult<Document> {
            let model = M::from_document(document.clone()).map_err(|e| {
                StoreError::Migration(format!(
                    "cannot decode document as {}: {e}",
                    M::model_name(),
                ))
            })?;
            model.to_document()
        };

        self.migrate_with(collection, &remap).await
    }

    /// Re-stamps the schema version on every outdated document without any
    /// type-specific re-encoding.
    pub async fn restamp_collection(&self, collection: &str) -> StoreResult<u64> {
        let remap = |document: &Document| -> StoreResult<Document> { Ok(document.clone()) };

        self.migrate_with(collection, &remap).await
    }

    /// Runs the migration loop: one document at a time, bounded by the
    /// collection size so the loop terminates even if documents keep matching
    /// the needs-migration predicate.
    pub async fn migrate_with(&self, collection: &str, remap: &RemapFn) -> StoreResult<u64> {
        let bound = self.backend.count_documents(collection, Document::new()).await?;
        let mut migrated = 0_u64;

        loop {
            let pending = self
                .backend
                .count_documents(collection, self.needs_migration_filter())
                .await?;

            if pending == 0 {
                info!(collection, migrated, "migration completed");
                return Ok(migrated);
            }

            if migrated >= bound {
                return Err(StoreError::Migration(format!(
                    "migration of {collection} did not converge after {bound} documents",
                )));
            }

            self.migrate_one_document(collection, remap).await?;
            migrated += 1;
        }
    }

    /// Migrates the single outdated document with the lowest identifier.
    ///
    /// Returns `false` when no document needs migration.
    pub async fn migrate_one_document(
        &self,
        collection: &str,
        remap: &RemapFn,
    ) -> StoreResult<bool> {
        let Some(document) = self
            .backend
            .find_one_document(
                collection,
                self.needs_migration_filter(),
                Some(doc! { ID_KEY: 1 }),
            )
            .await?
        else {
            return Ok(false);
        };

        let id = document.get(ID_KEY).cloned().ok_or_else(|| {
            StoreError::Migration(format!("document in {collection} has no identifier"))
        })?;

        let mut remapped = remap(&document)?;
        remapped.insert(SCHEMA_VERSION_KEY, self.schema_version.clone());
        remapped.insert(ID_KEY, id.clone());

        let matched = self
            .backend
            .replace_one_document(collection, doc! { ID_KEY: id.clone() }, remapped)
            .await?;

        if matched == 0 {
            return Err(StoreError::Migration(format!(
                "document {} vanished from {collection} during migration",
                stored_id_string(&id),
            )));
        }

        Ok(true)
    }
}
