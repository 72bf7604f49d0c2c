//! Request-scoped contexts carried through resource operations.
//!
//! A context is constructed once per request by the caller, mutated in place
//! as decoding and searching succeed, and discarded after the response is
//! produced.

use bson::Document;
use serde_json::Value;

use crate::{backend::SearchOptions, model::Model};

/// Per-request state for an operation on a single model.
#[derive(Debug, Clone)]
pub struct ModelContext<M: Model> {
    /// Identifier of the target model, when the operation addresses one.
    pub id: String,
    /// The payload exactly as received, kept for error reporting.
    pub source: Value,
    /// The decoded and validated model, populated as the operation proceeds.
    pub value: Option<M>,
}

impl<M: Model> ModelContext<M> {
    pub fn new(id: impl Into<String>) -> Self {
        ModelContext { id: id.into(), source: Value::Null, value: None }
    }

    /// The human-readable label used in error codes and messages.
    pub fn name(&self) -> &'static str {
        M::model_name()
    }
}

/// Per-request state for an operation on one element of a list-valued field.
#[derive(Debug, Clone)]
pub struct ModelFieldContext<M: Model> {
    /// Context of the owning model.
    pub model: ModelContext<M>,
    /// Name of the list-valued field on the parent model.
    pub field_name: String,
    /// Caller-supplied element identifier or numeric index.
    pub element_id: String,
}

impl<M: Model> ModelFieldContext<M> {
    pub fn new(
        model: ModelContext<M>,
        field_name: impl Into<String>,
        element_id: impl Into<String>,
    ) -> Self {
        ModelFieldContext { model, field_name: field_name.into(), element_id: element_id.into() }
    }

    /// The `<modelName>_<fieldName>` label used in element-level error codes.
    pub fn qualified_name(&self) -> String {
        format!("{}_{}", M::model_name(), self.field_name)
    }
}

/// A page query: filter, sort order, and the requested slice.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    /// Filter document selecting the result set.
    pub filter: Document,
    /// Sort order applied before slicing.
    pub sort: Document,
    /// Number of matches to skip.
    pub offset: u64,
    /// Maximum slice size.
    pub limit: u64,
}

impl PageQuery {
    pub fn new(filter: Document, sort: Document, offset: u64, limit: u64) -> Self {
        PageQuery { filter, sort, offset, limit }
    }

    /// Converts this query to backend search options: skip=offset,
    /// limit=limit, sort carried over when non-empty.
    pub fn to_search_options(&self) -> SearchOptions {
        let sort = if self.sort.is_empty() { None } else { Some(self.sort.clone()) };
        SearchOptions::new(self.offset, self.limit as i64, sort)
    }
}
