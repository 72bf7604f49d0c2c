//! A generic toolkit for building document-oriented CRUD services.
//!
//! This crate is the core of the modelkit project and provides:
//!
//! - **Model traits** ([`model`]) - Core traits for typed, validated views of stored documents
//! - **Filter construction** ([`query`]) - Incremental building of document filter expressions
//! - **Pipeline construction** ([`aggregate`]) - Ordered aggregation pipelines for nested-array queries
//! - **Pagination types** ([`page`]) - Page results and page-query parameters
//! - **Request contexts** ([`context`]) - Per-request state for model and nested-field operations
//! - **Backend abstraction** ([`backend`]) - The storage-access trait implemented by concrete stores
//! - **Repository** ([`repository`]) - Paginated search, single-document CRUD, and schema migration
//! - **Resource engine** ([`resources`]) - Shared create/retrieve/update/merge/delete semantics
//! - **Error handling** ([`error`]) - Error types and result aliases
//!
//! # Example
//!
//! ```ignore
//! use modelkit_core::model::{Model, FieldViolation};
//! use serde::{Serialize, Deserialize};
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
//!     fn model_name() -> &'static str {
//!         "user"
//!     }
//!
//!     fn collection_name() -> &'static str {
//!         "users"
//!     }
//!
//!     fn id(&self) -> Option<&str> {
//!         self.id.as_deref()
//!     }
//!
//!     fn set_id(&mut self, id: String) {
//!         self.id = Some(id);
//!     }
//!
//!     fn revision(&self) -> u64 {
//!         self.revision
//!     }
//!
//!     fn set_revision(&mut self, revision: u64) {
//!         self.revision = revision;
//!     }
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as modelkit_core;

pub mod aggregate;
pub mod backend;
pub mod context;
pub mod error;
pub mod model;
pub mod outcome;
pub mod page;
pub mod query;
pub mod repository;
pub mod resources;
