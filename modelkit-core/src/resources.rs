//! Shared create/retrieve/update/merge/delete semantics for models and for
//! elements of their list-valued fields.
//!
//! The engine is stateless; per-request state lives in the context objects.
//! Every operation follows the same shape (decode, search, act, respond) and
//! resolves to exactly one [`ResourceOutcome`]. Storage collaborators are
//! abstracted behind small per-role traits so one engine serves every
//! resource type; [`Repository`] implements all of them.

use async_trait::async_trait;
use serde_json::{Value, to_value};
use tracing::debug;
use uuid::Uuid;

use crate::{
    backend::DocumentBackend,
    context::{ModelContext, ModelFieldContext, PageQuery},
    error::{StoreError, StoreResult},
    model::{FieldElement, Model, ModelExt},
    outcome::{ErrorBody, ResourceOutcome},
    page::DocumentPage,
    repository::{Repository, id_to_model_mapper},
};

/// Finds a model by its opaque identifier; `None` means not found.
#[async_trait]
pub trait ModelSearcher<M: Model>: Send + Sync {
    async fn search(&self, id: &str) -> StoreResult<Option<M>>;
}

/// Persists a fresh model and returns the stored result.
#[async_trait]
pub trait ModelStorer<M: Model>: Send + Sync {
    async fn store(&self, model: &M) -> StoreResult<M>;
}

/// Persists a changed model and returns the stored result.
#[async_trait]
pub trait ModelUpdater<M: Model>: Send + Sync {
    async fn update(&self, model: &M) -> StoreResult<M>;
}

/// Deletes a model by its opaque identifier; deleting nothing is an error.
#[async_trait]
pub trait ModelDeleter<M: Model>: Send + Sync {
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Resolves a page query into a page result.
#[async_trait]
pub trait PageSearcher: Send + Sync {
    async fn search_page(&self, query: &PageQuery) -> StoreResult<DocumentPage>;
}

/// Reads and writes one list-valued field of a parent model.
///
/// There is no per-element document in storage; the list is part of the
/// parent document, so element operations always persist the whole parent.
pub trait FieldAccessor<M: Model>: Send + Sync {
    type Element: FieldElement;

    /// The field's current elements, or `None` when the field is null.
    fn get(&self, model: &M) -> Option<Vec<Self::Element>>;

    /// Replaces the field's elements on the model.
    fn set(&self, model: &mut M, elements: Option<Vec<Self::Element>>);
}

/// Locates one element inside a field list; `None` means not found.
pub trait ElementMatcher<E: FieldElement>: Send + Sync {
    fn locate(&self, elements: &[E], id: &str) -> Option<usize>;
}

/// Matches by a caller-supplied identity predicate, returning the first
/// satisfying index.
pub struct IdMatcher<F>(pub F);

impl<E, F> ElementMatcher<E> for IdMatcher<F>
where
    E: FieldElement,
    F: Fn(&E, &str) -> bool + Send + Sync,
{
    fn locate(&self, elements: &[E], id: &str) -> Option<usize> {
        elements.iter().position(|element| (self.0)(element, id))
    }
}

/// Matches by the element's own stored identifier.
pub struct ElementIdMatcher;

impl<E: FieldElement> ElementMatcher<E> for ElementIdMatcher {
    fn locate(&self, elements: &[E], id: &str) -> Option<usize> {
        elements.iter().position(|element| element.id() == Some(id))
    }
}

/// Treats the requested id as a 0-based numeric index; non-numeric or
/// out-of-range input is not found.
pub struct IndexMatcher;

impl<E: FieldElement> ElementMatcher<E> for IndexMatcher {
    fn locate(&self, elements: &[E], id: &str) -> Option<usize> {
        let index: usize = id.parse().ok()?;
        (index < elements.len()).then_some(index)
    }
}

#[async_trait]
impl<M: Model, B: DocumentBackend> ModelSearcher<M> for Repository<B> {
    async fn search(&self, id: &str) -> StoreResult<Option<M>> {
        self.find_model_by_id(id).await
    }
}

#[async_trait]
impl<M: Model, B: DocumentBackend> ModelStorer<M> for Repository<B> {
    async fn store(&self, model: &M) -> StoreResult<M> {
        self.store_model(model).await
    }
}

#[async_trait]
impl<M: Model, B: DocumentBackend> ModelUpdater<M> for Repository<B> {
    async fn update(&self, model: &M) -> StoreResult<M> {
        self.replace_model(model).await
    }
}

#[async_trait]
impl<M: Model, B: DocumentBackend> ModelDeleter<M> for Repository<B> {
    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.delete_model_by_id::<M>(id).await
    }
}

/// A [`PageSearcher`] running a model collection's page query through a
/// repository, with identifiers renamed to the model-facing `id` field.
pub struct RepositoryPageSearcher<'a, B: DocumentBackend> {
    repository: &'a Repository<B>,
    collection: &'a str,
    result_key: &'a str,
}

impl<'a, B: DocumentBackend> RepositoryPageSearcher<'a, B> {
    pub fn new(repository: &'a Repository<B>, collection: &'a str, result_key: &'a str) -> Self {
        RepositoryPageSearcher { repository, collection, result_key }
    }
}

#[async_trait]
impl<B: DocumentBackend> PageSearcher for RepositoryPageSearcher<'_, B> {
    async fn search_page(&self, query: &PageQuery) -> StoreResult<DocumentPage> {
        self.repository
            .search_page(
                self.collection,
                query.filter.clone(),
                query.to_search_options(),
                self.result_key,
                Some(&id_to_model_mapper),
            )
            .await
    }
}

/// Error code for page queries the page searcher could not resolve.
pub const PAGE_RETRIEVAL_FAILED: &str = "page_retrieval_failed";

/// The stateless operation engine.
pub struct ModelResources;

impl ModelResources {
    /// Searches a model by id: found is `200` with the model body, not found
    /// is `404` coded to the model name.
    pub async fn retrieve_model<M: Model>(
        ctx: &mut ModelContext<M>,
        searcher: &impl ModelSearcher<M>,
    ) -> ResourceOutcome {
        let model = match searcher.search(&ctx.id).await {
            Ok(Some(model)) => model,
            Ok(None) => return Self::model_not_found::<M>(&ctx.id),
            Err(e) => return Self::storage_failure::<M>(&e),
        };

        match model.to_json() {
            Ok(body) => {
                ctx.value = Some(model);
                ResourceOutcome::Ok(body)
            }
            Err(e) => Self::storage_failure::<M>(&e),
        }
    }

    /// Deletes a model by id: success is `204` with no body, not found is
    /// `404`.
    pub async fn delete_model<M: Model>(
        ctx: &ModelContext<M>,
        deleter: &impl ModelDeleter<M>,
    ) -> ResourceOutcome {
        match deleter.delete(&ctx.id).await {
            Ok(()) => ResourceOutcome::NoContent,
            Err(StoreError::DocumentNotFound(..)) => Self::model_not_found::<M>(&ctx.id),
            Err(e) => Self::storage_failure::<M>(&e),
        }
    }

    /// Decodes, validates, and stores a new model: success is `201` with the
    /// stored model. Storer failures are client errors, not server faults; a
    /// persistence-level rejection (such as a duplicate business key) is
    /// something the caller can correct.
    pub async fn create_model<M: Model>(
        payload: Value,
        ctx: &mut ModelContext<M>,
        storer: &impl ModelStorer<M>,
    ) -> ResourceOutcome {
        let model = match Self::to_model(payload, ctx) {
            Ok(model) => model,
            Err(outcome) => return outcome,
        };

        if let Err(outcome) = Self::validate(&model) {
            return outcome;
        }

        let stored = match storer.store(&model).await {
            Ok(stored) => stored,
            Err(e) => return Self::storage_failure::<M>(&e),
        };

        match stored.to_json() {
            Ok(body) => {
                if let Some(id) = stored.id() {
                    ctx.id = id.to_string();
                }
                ctx.value = Some(stored);
                debug!(model = M::model_name(), id = %ctx.id, "model created");
                ResourceOutcome::Created(body)
            }
            Err(e) => Self::storage_failure::<M>(&e),
        }
    }

    /// Replaces a stored model with the decoded payload.
    ///
    /// A payload equal to the original is rejected with code
    /// `"<modelName>_to_update_equal_to_original"`; callers must only send
    /// real changes.
    pub async fn update_model<M: Model>(
        payload: Value,
        ctx: &mut ModelContext<M>,
        searcher: &impl ModelSearcher<M>,
        updater: &impl ModelUpdater<M>,
    ) -> ResourceOutcome {
        let candidate = match Self::to_model(payload, ctx) {
            Ok(model) => model,
            Err(outcome) => return outcome,
        };

        let original = match searcher.search(&ctx.id).await {
            Ok(Some(original)) => original,
            Ok(None) => return Self::model_not_found::<M>(&ctx.id),
            Err(e) => return Self::storage_failure::<M>(&e),
        };

        let mut next = candidate;
        next.set_id(ctx.id.clone());
        next.set_revision(original.revision());

        Self::persist_change(ctx, next, original, updater, "update").await
    }

    /// Merges the payload field-by-field onto a copy of the original;
    /// unspecified fields are retained. A merge that changes nothing is
    /// rejected with code `"<modelName>_to_merge_equal_to_original"`.
    pub async fn merge_model<M: Model>(
        payload: Value,
        ctx: &mut ModelContext<M>,
        searcher: &impl ModelSearcher<M>,
        updater: &impl ModelUpdater<M>,
    ) -> ResourceOutcome {
        ctx.source = payload.clone();
        if payload.is_null() {
            return Self::bad_payload::<M>("payload is null");
        }

        let original = match searcher.search(&ctx.id).await {
            Ok(Some(original)) => original,
            Ok(None) => return Self::model_not_found::<M>(&ctx.id),
            Err(e) => return Self::storage_failure::<M>(&e),
        };

        let mut merged_json = match original.to_json() {
            Ok(value) => value,
            Err(e) => return Self::storage_failure::<M>(&e),
        };
        deep_merge(&mut merged_json, &payload);

        let mut next = match Self::decode::<M>(merged_json) {
            Ok(model) => model,
            Err(outcome) => return outcome,
        };
        next.set_id(ctx.id.clone());
        next.set_revision(original.revision());

        Self::persist_change(ctx, next, original, updater, "merge").await
    }

    /// Retrieves the elements of a list-valued field.
    ///
    /// A null or absent field is `200` with an empty list, never a `404`.
    pub async fn retrieve_model_field<M, A>(
        ctx: &mut ModelFieldContext<M>,
        searcher: &impl ModelSearcher<M>,
        accessor: &A,
    ) -> ResourceOutcome
    where
        M: Model,
        A: FieldAccessor<M>,
    {
        let parent = match searcher.search(&ctx.model.id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => return Self::model_not_found::<M>(&ctx.model.id),
            Err(e) => return Self::storage_failure::<M>(&e),
        };

        let elements = accessor.get(&parent).unwrap_or_default();

        match to_value(&elements) {
            Ok(body) => {
                ctx.model.value = Some(parent);
                ResourceOutcome::Ok(body)
            }
            Err(e) => Self::storage_failure::<M>(&e.into()),
        }
    }

    /// Retrieves one element of a list-valued field, located by the matcher.
    pub async fn retrieve_model_field_element<M, A>(
        ctx: &mut ModelFieldContext<M>,
        searcher: &impl ModelSearcher<M>,
        accessor: &A,
        matcher: &impl ElementMatcher<A::Element>,
    ) -> ResourceOutcome
    where
        M: Model,
        A: FieldAccessor<M>,
    {
        let parent = match searcher.search(&ctx.model.id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => return Self::model_not_found::<M>(&ctx.model.id),
            Err(e) => return Self::storage_failure::<M>(&e),
        };

        let elements = accessor.get(&parent).unwrap_or_default();
        let Some(index) = matcher.locate(&elements, &ctx.element_id) else {
            return Self::element_not_found(ctx);
        };

        match to_value(&elements[index]) {
            Ok(body) => {
                ctx.model.value = Some(parent);
                ResourceOutcome::Ok(body)
            }
            Err(e) => Self::storage_failure::<M>(&e.into()),
        }
    }

    /// Appends a new element to the field, initializing the list when null,
    /// and persists the whole parent. The element receives a fresh
    /// server-generated id; success is `201` with the element body.
    pub async fn create_model_field_element<M, A>(
        payload: Value,
        ctx: &mut ModelFieldContext<M>,
        searcher: &impl ModelSearcher<M>,
        updater: &impl ModelUpdater<M>,
        accessor: &A,
    ) -> ResourceOutcome
    where
        M: Model,
        A: FieldAccessor<M>,
    {
        ctx.model.source = payload.clone();
        let mut element = match Self::decode_element::<M, A::Element>(ctx, payload) {
            Ok(element) => element,
            Err(outcome) => return outcome,
        };

        let mut parent = match searcher.search(&ctx.model.id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => return Self::model_not_found::<M>(&ctx.model.id),
            Err(e) => return Self::storage_failure::<M>(&e),
        };

        element.assign_id(Uuid::new_v4().to_string());

        let mut elements = accessor.get(&parent).unwrap_or_default();
        elements.push(element.clone());
        accessor.set(&mut parent, Some(elements));

        if let Err(outcome) = Self::validate(&parent) {
            return outcome;
        }

        match updater.update(&parent).await {
            Ok(updated) => {
                ctx.model.value = Some(updated);
                match to_value(&element) {
                    Ok(body) => ResourceOutcome::Created(body),
                    Err(e) => Self::storage_failure::<M>(&e.into()),
                }
            }
            Err(e) => Self::storage_failure::<M>(&e),
        }
    }

    /// Replaces one element in place and persists the whole parent. The
    /// element keeps its stored identifier regardless of the payload.
    pub async fn update_model_field_element<M, A>(
        payload: Value,
        ctx: &mut ModelFieldContext<M>,
        searcher: &impl ModelSearcher<M>,
        updater: &impl ModelUpdater<M>,
        accessor: &A,
        matcher: &impl ElementMatcher<A::Element>,
    ) -> ResourceOutcome
    where
        M: Model,
        A: FieldAccessor<M>,
    {
        ctx.model.source = payload.clone();
        let next = match Self::decode_element::<M, A::Element>(ctx, payload) {
            Ok(element) => element,
            Err(outcome) => return outcome,
        };

        Self::replace_element(ctx, searcher, updater, accessor, matcher, |_| Ok(next)).await
    }

    /// Merges the payload onto one element and persists the whole parent.
    pub async fn merge_model_field_element<M, A>(
        payload: Value,
        ctx: &mut ModelFieldContext<M>,
        searcher: &impl ModelSearcher<M>,
        updater: &impl ModelUpdater<M>,
        accessor: &A,
        matcher: &impl ElementMatcher<A::Element>,
    ) -> ResourceOutcome
    where
        M: Model,
        A: FieldAccessor<M>,
    {
        ctx.model.source = payload.clone();
        if payload.is_null() {
            return Self::bad_element_payload(ctx, "payload is null");
        }

        let qualified = ctx.qualified_name();
        Self::replace_element(ctx, searcher, updater, accessor, matcher, move |original| {
            let mut merged_json = to_value(original)
                .map_err(|e| ResourceOutcome::BadRequest(ErrorBody::new(&qualified, e.to_string())))?;
            deep_merge(&mut merged_json, &payload);
            serde_json::from_value(merged_json).map_err(|e| {
                ResourceOutcome::BadRequest(ErrorBody::new(
                    &qualified,
                    format!("cannot read {qualified}: {e}"),
                ))
            })
        })
        .await
    }

    /// Removes one element from the field, re-validates the parent, and
    /// persists it; success is `204` with no body.
    pub async fn delete_model_field_element<M, A>(
        ctx: &mut ModelFieldContext<M>,
        searcher: &impl ModelSearcher<M>,
        updater: &impl ModelUpdater<M>,
        accessor: &A,
        matcher: &impl ElementMatcher<A::Element>,
    ) -> ResourceOutcome
    where
        M: Model,
        A: FieldAccessor<M>,
    {
        let mut parent = match searcher.search(&ctx.model.id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => return Self::model_not_found::<M>(&ctx.model.id),
            Err(e) => return Self::storage_failure::<M>(&e),
        };

        let mut elements = accessor.get(&parent).unwrap_or_default();
        let Some(index) = matcher.locate(&elements, &ctx.element_id) else {
            return Self::element_not_found(ctx);
        };

        elements.remove(index);
        accessor.set(&mut parent, Some(elements));

        if let Err(outcome) = Self::validate(&parent) {
            return outcome;
        }

        match updater.update(&parent).await {
            Ok(updated) => {
                ctx.model.value = Some(updated);
                ResourceOutcome::NoContent
            }
            Err(e) => Self::storage_failure::<M>(&e),
        }
    }

    /// Resolves a page query via the searcher: success is `200` with the page
    /// document, any failure is `400` with a generic code/message pair.
    pub async fn retrieve_models_page(
        query: &PageQuery,
        searcher: &impl PageSearcher,
    ) -> ResourceOutcome {
        let page = match searcher.search_page(query).await {
            Ok(page) => page,
            Err(e) => {
                return ResourceOutcome::BadRequest(ErrorBody::new(
                    PAGE_RETRIEVAL_FAILED,
                    e.to_string(),
                ));
            }
        };

        match to_value(page.to_document()) {
            Ok(body) => ResourceOutcome::Ok(body),
            Err(e) => {
                ResourceOutcome::BadRequest(ErrorBody::new(PAGE_RETRIEVAL_FAILED, e.to_string()))
            }
        }
    }

    /// The shared decode step used by create, update, and merge. Records the
    /// payload on the context and decodes it into the model type; a null
    /// payload or decode failure produces a `400` whose code and message both
    /// carry the model's human name.
    pub fn to_model<M: Model>(
        payload: Value,
        ctx: &mut ModelContext<M>,
    ) -> Result<M, ResourceOutcome> {
        ctx.source = payload.clone();
        Self::decode(payload)
    }

    /// Runs domain validation: a violation produces a `400` with a
    /// field-qualified code such as `"user.siblings[0].id"`.
    pub fn validate<M: Model>(model: &M) -> Result<(), ResourceOutcome> {
        model.validate().map_err(|violation| {
            ResourceOutcome::BadRequest(ErrorBody::new(
                format!("{}.{}", M::model_name(), violation.path),
                violation.message,
            ))
        })
    }

    fn decode<M: Model>(payload: Value) -> Result<M, ResourceOutcome> {
        if payload.is_null() {
            return Err(Self::bad_payload::<M>("payload is null"));
        }

        M::from_json(payload).map_err(|e| Self::bad_payload::<M>(&e.to_string()))
    }

    fn decode_element<M: Model, E: FieldElement>(
        ctx: &ModelFieldContext<M>,
        payload: Value,
    ) -> Result<E, ResourceOutcome> {
        if payload.is_null() {
            return Err(Self::bad_element_payload(ctx, "payload is null"));
        }

        serde_json::from_value(payload).map_err(|e| Self::bad_element_payload(ctx, &e.to_string()))
    }

    async fn persist_change<M: Model>(
        ctx: &mut ModelContext<M>,
        next: M,
        original: M,
        updater: &impl ModelUpdater<M>,
        verb: &str,
    ) -> ResourceOutcome {
        if let Err(outcome) = Self::validate(&next) {
            return outcome;
        }

        if next == original {
            return ResourceOutcome::BadRequest(ErrorBody::new(
                format!("{}_to_{verb}_equal_to_original", M::model_name()),
                format!("the {} to {verb} is equal to the original", M::model_name()),
            ));
        }

        match updater.update(&next).await {
            Ok(updated) => match updated.to_json() {
                Ok(body) => {
                    ctx.value = Some(updated);
                    ResourceOutcome::Ok(body)
                }
                Err(e) => Self::storage_failure::<M>(&e),
            },
            Err(e) => Self::storage_failure::<M>(&e),
        }
    }

    async fn replace_element<M, A, F>(
        ctx: &mut ModelFieldContext<M>,
        searcher: &impl ModelSearcher<M>,
        updater: &impl ModelUpdater<M>,
        accessor: &A,
        matcher: &impl ElementMatcher<A::Element>,
        make_next: F,
    ) -> ResourceOutcome
    where
        M: Model,
        A: FieldAccessor<M>,
        F: FnOnce(&A::Element) -> Result<A::Element, ResourceOutcome>,
    {
        let mut parent = match searcher.search(&ctx.model.id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => return Self::model_not_found::<M>(&ctx.model.id),
            Err(e) => return Self::storage_failure::<M>(&e),
        };

        let mut elements = accessor.get(&parent).unwrap_or_default();
        let Some(index) = matcher.locate(&elements, &ctx.element_id) else {
            return Self::element_not_found(ctx);
        };

        let mut next = match make_next(&elements[index]) {
            Ok(next) => next,
            Err(outcome) => return outcome,
        };
        if let Some(id) = elements[index].id() {
            next.assign_id(id.to_string());
        }

        elements[index] = next.clone();
        accessor.set(&mut parent, Some(elements));

        if let Err(outcome) = Self::validate(&parent) {
            return outcome;
        }

        match updater.update(&parent).await {
            Ok(updated) => {
                ctx.model.value = Some(updated);
                match to_value(&next) {
                    Ok(body) => ResourceOutcome::Ok(body),
                    Err(e) => Self::storage_failure::<M>(&e.into()),
                }
            }
            Err(e) => Self::storage_failure::<M>(&e),
        }
    }

    fn model_not_found<M: Model>(id: &str) -> ResourceOutcome {
        ResourceOutcome::NotFound(ErrorBody::new(
            M::model_name(),
            format!("{} {id} not found", M::model_name()),
        ))
    }

    fn element_not_found<M: Model>(ctx: &ModelFieldContext<M>) -> ResourceOutcome {
        ResourceOutcome::NotFound(ErrorBody::new(
            ctx.qualified_name(),
            format!(
                "no element {} in field {} of {} {}",
                ctx.element_id,
                ctx.field_name,
                M::model_name(),
                ctx.model.id,
            ),
        ))
    }

    fn bad_payload<M: Model>(detail: &str) -> ResourceOutcome {
        ResourceOutcome::BadRequest(ErrorBody::new(
            M::model_name(),
            format!("cannot read {}: {detail}", M::model_name()),
        ))
    }

    fn bad_element_payload<M: Model>(ctx: &ModelFieldContext<M>, detail: &str) -> ResourceOutcome {
        let qualified = ctx.qualified_name();
        ResourceOutcome::BadRequest(ErrorBody::new(
            &qualified,
            format!("cannot read {qualified}: {detail}"),
        ))
    }

    fn storage_failure<M: Model>(error: &StoreError) -> ResourceOutcome {
        ResourceOutcome::BadRequest(ErrorBody::new(M::model_name(), error.to_string()))
    }
}

/// Merges `patch` onto `base`: objects merge recursively, every other value
/// (including null) replaces the base value.
fn deep_merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(key) {
                    Some(slot) if slot.is_object() && value.is_object() => {
                        deep_merge(slot, value);
                    }
                    _ => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        label: String,
    }

    impl FieldElement for Item {
        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn assign_id(&mut self, id: String) {
            self.id = Some(id);
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item { id: Some("a".to_string()), label: "first".to_string() },
            Item { id: Some("b".to_string()), label: "second".to_string() },
        ]
    }

    #[test]
    fn element_id_matcher_finds_by_stored_id() {
        let elements = items();

        assert_eq!(ElementIdMatcher.locate(&elements, "b"), Some(1));
        assert_eq!(ElementIdMatcher.locate(&elements, "z"), None);
        assert_eq!(ElementIdMatcher.locate(&Vec::<Item>::new(), "a"), None);
    }

    #[test]
    fn id_matcher_uses_the_predicate() {
        let matcher = IdMatcher(|item: &Item, id: &str| item.label == id);

        assert_eq!(matcher.locate(&items(), "second"), Some(1));
        assert_eq!(matcher.locate(&items(), "third"), None);
    }

    #[test]
    fn index_matcher_rejects_bad_indices() {
        let elements = items();

        assert_eq!(IndexMatcher.locate(&elements, "0"), Some(0));
        assert_eq!(IndexMatcher.locate(&elements, "2"), None);
        assert_eq!(IndexMatcher.locate(&elements, "-1"), None);
        assert_eq!(IndexMatcher.locate(&elements, "one"), None);
    }

    #[test]
    fn deep_merge_retains_unspecified_fields() {
        let mut base = json!({ "name": "ada", "address": { "city": "london", "zip": "n1" } });

        deep_merge(&mut base, &json!({ "address": { "city": "paris" } }));

        assert_eq!(
            base,
            json!({ "name": "ada", "address": { "city": "paris", "zip": "n1" } })
        );
    }

    #[test]
    fn deep_merge_null_overwrites() {
        let mut base = json!({ "name": "ada", "email": "a@b.c" });

        deep_merge(&mut base, &json!({ "email": null }));

        assert_eq!(base, json!({ "name": "ada", "email": null }));
    }
}
