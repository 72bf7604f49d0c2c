//! In-memory document storage backend for modelkit.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `DocumentBackend` trait. It uses async-aware read-write locks for
//! concurrent access and interprets the same operator-document filters and
//! aggregation pipelines as the persistent backends, making it ideal for
//! development and testing.
//!
//! # Quick Start
//!
//! ```ignore
//! use modelkit::{memory::MemoryStore, repository::Repository};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MemoryStore::new();
//!     let repository = Repository::new(backend, "v1");
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as modelkit_memory;

pub mod evaluator;
pub mod pipeline;
pub mod store;

pub use store::{MemoryStore, MemoryStoreBuilder};
