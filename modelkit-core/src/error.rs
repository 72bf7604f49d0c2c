//! Error types and result types for modelkit operations.
//!
//! This module provides error handling for the repository, the backends, and
//! schema migration. Use [`StoreResult<T>`] as the return type for fallible
//! operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with the
/// document store.
///
/// This enum covers serialization errors, document lifecycle issues, write
/// conflicts, and backend-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document passed for storage already declares an identifier.
    /// Identifiers are assigned by the store, never by the caller.
    #[error("Document already declares an identifier in collection {0}")]
    DocumentAlreadyHasId(String),
    /// No document matched the given criteria in the collection.
    /// The first argument is the collection name, the second describes the criteria.
    #[error("Document not found in collection {0}: {1}")]
    DocumentNotFound(String, String),
    /// The requested collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// The document violates structural constraints.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An optimistic-concurrency check failed: the document was modified
    /// between read and write.
    #[error("Write conflict: {0}")]
    Conflict(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// An error occurred during schema migration.
    #[error("Migration error: {0}")]
    Migration(String),
    /// An unknown error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A specialized `Result` type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
