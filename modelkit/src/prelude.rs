//! Convenient re-exports of commonly used types from modelkit.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use modelkit::prelude::*;
//! ```

pub use modelkit_core::{
    aggregate::{PipelineBuilder, split_element_path},
    backend::{BackendBuilder, DocumentBackend, ID_KEY, SearchOptions},
    context::{ModelContext, ModelFieldContext, PageQuery},
    error::{StoreError, StoreResult},
    model::{FieldElement, FieldViolation, Model, ModelExt},
    outcome::{ErrorBody, ResourceOutcome},
    page::DocumentPage,
    query::FilterBuilder,
    repository::{DocumentMapper, Repository, id_to_model_mapper},
    resources::{
        ElementIdMatcher, ElementMatcher, FieldAccessor, IdMatcher, IndexMatcher, ModelDeleter,
        ModelResources, ModelSearcher, ModelStorer, ModelUpdater, PageSearcher,
        RepositoryPageSearcher,
    },
};
