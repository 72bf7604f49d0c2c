//! Main modelkit crate providing a unified interface for document-backed
//! model resources.
//!
//! This crate is the primary entry point for users of the modelkit toolkit.
//! It re-exports the core types from the sub-crates and provides convenient
//! access to the storage backends.
//!
//! # Features
//!
//! - **Typed models** - Define your models with Serde and validate them at the boundary
//! - **Filter and pipeline builders** - Compose searches from optional parameters safely
//! - **Repository** - Paginated search, single-document CRUD, schema-version migration
//! - **Resource engine** - Shared create/retrieve/update/merge/delete semantics for
//!   models and elements of their list-valued fields
//! - **Multiple backends** - In-memory and MongoDB storage behind one trait
//!
//! # Quick Start
//!
//! ```ignore
//! use modelkit::{prelude::*, memory::MemoryStore};
//! use serde::{Serialize, Deserialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(default, skip_serializing_if = "Option::is_none")]
//!     pub id: Option<String>,
//!     #[serde(default)]
//!     pub revision: u64,
//!     pub name: String,
//! }
//!
//! impl Model for User {
//!     fn model_name() -> &'static str { "user" }
//!     fn collection_name() -> &'static str { "users" }
//!     fn id(&self) -> Option<&str> { self.id.as_deref() }
//!     fn set_id(&mut self, id: String) { self.id = Some(id); }
//!     fn revision(&self) -> u64 { self.revision }
//!     fn set_revision(&mut self, revision: u64) { self.revision = revision; }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let repository = Repository::new(MemoryStore::new(), "v1");
//!
//!     let mut ctx = ModelContext::<User>::new("");
//!     let outcome = ModelResources::create_model(
//!         json!({ "name": "Alice" }),
//!         &mut ctx,
//!         &repository,
//!     )
//!     .await;
//!
//!     assert_eq!(outcome.status(), 201);
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use modelkit_core::{
    aggregate, backend, context, error, model, outcome, page, query, repository, resources,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use modelkit_memory::{MemoryStore, MemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use modelkit_mongodb::{MongoStore, MongoStoreBuilder};
}
