//! MongoDB storage backend for modelkit.
//!
//! Maps the `DocumentBackend` trait directly onto the official MongoDB
//! driver: the operator-document filters and aggregation pipelines produced
//! by the builders are the driver's native dialect and pass through verbatim.
//!
//! # Quick Start
//!
//! ```ignore
//! use modelkit_mongodb::MongoStore;
//! use modelkit_core::repository::Repository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MongoStore::builder("mongodb://localhost:27017", "app")
//!         .build()
//!         .await?;
//!     let repository = Repository::new(backend, "v1");
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as modelkit_mongodb;

pub mod store;

pub use store::{MongoStore, MongoStoreBuilder};
