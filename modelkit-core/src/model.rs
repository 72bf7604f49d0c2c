//! Core traits and types for typed models and their document representation.
//!
//! This module provides the traits that application-level models must
//! implement, as well as utilities for converting models between their stored
//! document form and JSON payloads.

use bson::{Bson, de::deserialize_from_bson, oid::ObjectId, ser::serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, from_value, to_value};

use crate::{
    backend::ID_KEY,
    error::{StoreError, StoreResult},
};

/// A single domain-validation failure, qualified by the path of the offending
/// field relative to the model root (e.g. `siblings[0].id`).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    /// Path of the invalid field relative to the model.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

/// Core trait for application models persisted as documents.
///
/// Every model has a human-readable name (used to build error codes), a
/// collection it is stored in, an optional store-assigned identifier, and a
/// revision counter used for optimistic concurrency on the read-modify-write
/// cycle. Domain validation defaults to accepting everything.
///
/// # Example
///
/// ```ignore
/// use modelkit_core::model::{Model, FieldViolation};
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// pub struct Community {
///     #[serde(default, skip_serializing_if = "Option::is_none")]
///     pub id: Option<String>,
///     #[serde(default)]
///     pub revision: u64,
///     pub name: String,
/// }
///
/// impl Model for Community {
///     fn model_name() -> &'static str { "community" }
///     fn collection_name() -> &'static str { "communities" }
///     fn id(&self) -> Option<&str> { self.id.as_deref() }
///     fn set_id(&mut self, id: String) { self.id = Some(id); }
///     fn revision(&self) -> u64 { self.revision }
///     fn set_revision(&mut self, revision: u64) { self.revision = revision; }
///
///     fn validate(&self) -> Result<(), FieldViolation> {
///         if self.name.trim().is_empty() {
///             return Err(FieldViolation::new("name", "name must not be blank"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Model:
    Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static
{
    /// Returns the human-readable label of this model, used in error codes
    /// and messages (e.g. `"user"` producing codes like `"user_siblings"`).
    fn model_name() -> &'static str;

    /// Returns the name of the collection this model is stored in.
    fn collection_name() -> &'static str;

    /// Returns the store-assigned identifier, if this model has been persisted.
    fn id(&self) -> Option<&str>;

    /// Sets the store-assigned identifier.
    fn set_id(&mut self, id: String);

    /// Returns the revision counter used for optimistic concurrency checks.
    fn revision(&self) -> u64;

    /// Sets the revision counter.
    fn set_revision(&mut self, revision: u64);

    /// Runs domain validation on this model.
    ///
    /// The default implementation accepts every model. Implementations should
    /// return the first violation found, with the path qualified relative to
    /// the model root.
    fn validate(&self) -> Result<(), FieldViolation> {
        Ok(())
    }
}

/// An element stored inside a list-valued field of a parent model.
///
/// Elements have no document of their own; they live inside the parent's
/// document and are located by an element matcher. Create operations stamp a
/// fresh server-generated identifier via [`FieldElement::assign_id`].
pub trait FieldElement:
    Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static
{
    /// Returns the element's identifier, if it has one.
    fn id(&self) -> Option<&str>;

    /// Assigns an identifier to this element.
    fn assign_id(&mut self, id: String);
}

/// Extension trait providing serialization utilities for models.
///
/// This trait is automatically implemented for all types that implement
/// [`Model`]. Conversion to the stored form moves the model's `id` out of the
/// body (the store keys documents by `_id`); conversion back translates `_id`
/// into the model's string `id` field.
pub trait ModelExt: Model {
    /// Converts this model to its stored document form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the model does not
    /// serialize to a document.
    fn to_document(&self) -> StoreResult<bson::Document>;

    /// Builds a model from a stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    fn from_document(document: bson::Document) -> StoreResult<Self>;

    /// Converts this model to a JSON value.
    fn to_json(&self) -> StoreResult<Value>;

    /// Builds a model from a JSON value.
    fn from_json(value: Value) -> StoreResult<Self>;
}

impl<M: Model> ModelExt for M {
    fn to_document(&self) -> StoreResult<bson::Document> {
        let bson = serialize_to_bson(self)?;
        let mut document = bson
            .as_document()
            .cloned()
            .ok_or_else(|| {
                StoreError::Serialization(format!(
                    "{} did not serialize to a document",
                    M::model_name()
                ))
            })?;

        // The identifier travels as `_id` at the storage boundary.
        document.remove("id");

        Ok(document)
    }

    fn from_document(mut document: bson::Document) -> StoreResult<Self> {
        if let Some(id) = document.remove(ID_KEY) {
            document.insert("id", Bson::String(stored_id_string(&id)));
        }

        Ok(deserialize_from_bson(Bson::Document(document))?)
    }

    fn to_json(&self) -> StoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> StoreResult<Self> {
        Ok(from_value(value)?)
    }
}

/// Renders a stored identifier value as an opaque string for model use.
pub fn stored_id_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses an opaque string identifier back into its stored value.
///
/// Identifiers that parse as a driver object id are compared as such; every
/// other identifier is compared as a plain string.
pub fn stored_id_value(id: &str) -> Bson {
    ObjectId::parse_str(id)
        .map(Bson::ObjectId)
        .unwrap_or_else(|_| Bson::String(id.to_string()))
}
