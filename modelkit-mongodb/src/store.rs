use async_trait::async_trait;
use bson::{Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};

use modelkit_core::{
    backend::{BackendBuilder, DocumentBackend, SearchOptions},
    error::{StoreError, StoreResult},
};

/// MongoDB-backed implementation of the document backend.
///
/// Filters, update documents, and aggregation pipelines pass straight through
/// to the driver.
#[derive(Debug)]
pub struct MongoStore {
    client: Client,
    database: String,
}

impl MongoStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoStoreBuilder {
        MongoStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client.database(&self.database).collection(collection_name)
    }

    /// Closes the underlying client; pending operations are allowed to
    /// finish.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[async_trait]
impl DocumentBackend for MongoStore {
    async fn count_documents(&self, collection: &str, filter: Document) -> StoreResult<u64> {
        self.get_collection(collection)
            .count_documents(filter)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn find_documents(
        &self,
        collection: &str,
        filter: Document,
        options: SearchOptions,
    ) -> StoreResult<Vec<Document>> {
        let mut find_options = FindOptions::default();

        if options.skip > 0 {
            find_options.skip = Some(options.skip);
        }
        if options.limit > 0 {
            find_options.limit = Some(options.limit);
        }
        if let Some(sort) = options.sort {
            find_options.sort = Some(sort);
        }

        self.get_collection(collection)
            .find(filter)
            .with_options(find_options)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn find_one_document(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> StoreResult<Option<Document>> {
        // The find_one action borrows the collection, so it needs a binding
        // that outlives the await.
        let collection = self.get_collection(collection);
        let mut query = collection.find_one(filter);

        if let Some(sort) = sort {
            query = query.sort(sort);
        }

        query.await.map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn insert_document(&self, collection: &str, document: Document) -> StoreResult<Bson> {
        let result = self
            .get_collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(result.inserted_id)
    }

    async fn update_one_document(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> StoreResult<u64> {
        let result = self
            .get_collection(collection)
            .update_one(filter, update)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(result.matched_count)
    }

    async fn replace_one_document(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
    ) -> StoreResult<u64> {
        let result = self
            .get_collection(collection)
            .replace_one(filter, replacement)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(result.matched_count)
    }

    async fn delete_one_document(&self, collection: &str, filter: Document) -> StoreResult<u64> {
        let result = self
            .get_collection(collection)
            .delete_one(filter)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(result.deleted_count)
    }

    async fn aggregate_documents(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> StoreResult<Vec<Document>> {
        self.get_collection(collection)
            .aggregate(pipeline)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

/// Builder holding the connection string and database name of a
/// [`MongoStore`].
pub struct MongoStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self { dsn: dsn.to_string(), database: database.to_string() }
    }
}

#[async_trait]
impl BackendBuilder for MongoStoreBuilder {
    type Backend = MongoStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MongoStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| StoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| StoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The client connects lazily, so building a store needs no server.
    #[tokio::test]
    async fn builder_constructs_a_store_from_a_valid_dsn() {
        let store = MongoStore::builder("mongodb://localhost:27017", "app")
            .build()
            .await
            .unwrap();

        store.shutdown().await;
    }

    #[tokio::test]
    async fn builder_rejects_a_malformed_dsn() {
        let result = MongoStore::builder("not-a-dsn", "app").build().await;

        assert!(matches!(result, Err(StoreError::Initialization(_))));
    }
}
