mod support;

use modelkit::{
    context::{ModelContext, ModelFieldContext},
    resources::{ElementIdMatcher, IndexMatcher, ModelResources},
};
use serde_json::{Value, json};

use support::{Dummy, MembersAccessor, SiblingsAccessor, Team, repository};

type Repo = modelkit::repository::Repository<modelkit::memory::MemoryStore>;

async fn create_parent(repo: &Repo) -> String {
    let mut ctx = ModelContext::<Dummy>::new("");
    let outcome =
        ModelResources::create_model(json!({ "name": "parent" }), &mut ctx, repo).await;
    assert_eq!(outcome.status(), 201);
    ctx.id
}

async fn create_sibling(repo: &Repo, parent_id: &str, name: &str) -> String {
    let mut ctx = field_ctx(parent_id, "");
    let outcome = ModelResources::create_model_field_element(
        json!({ "name": name }),
        &mut ctx,
        repo,
        repo,
        &SiblingsAccessor,
    )
    .await;

    assert_eq!(outcome.status(), 201, "element create failed: {outcome:?}");
    outcome.body().unwrap()["id"].as_str().unwrap().to_string()
}

fn field_ctx(parent_id: &str, element_id: &str) -> ModelFieldContext<Dummy> {
    ModelFieldContext::new(ModelContext::new(parent_id), "siblings", element_id)
}

#[tokio::test]
async fn absent_field_retrieves_as_empty_list() {
    let repo = repository();
    let parent_id = create_parent(&repo).await;

    let mut ctx = field_ctx(&parent_id, "");
    let outcome = ModelResources::retrieve_model_field(&mut ctx, &repo, &SiblingsAccessor).await;

    assert_eq!(outcome.status(), 200);
    assert_eq!(outcome.body(), Some(&json!([])));
}

#[tokio::test]
async fn created_element_gets_id_and_is_retrievable() {
    let repo = repository();
    let parent_id = create_parent(&repo).await;
    let element_id = create_sibling(&repo, &parent_id, "sib").await;

    let mut ctx = field_ctx(&parent_id, &element_id);
    let outcome = ModelResources::retrieve_model_field_element(
        &mut ctx,
        &repo,
        &SiblingsAccessor,
        &ElementIdMatcher,
    )
    .await;

    assert_eq!(outcome.status(), 200);
    let body = outcome.body().unwrap();
    assert_eq!(body["id"], json!(element_id));
    assert_eq!(body["name"], json!("sib"));
}

#[tokio::test]
async fn elements_are_addressable_by_index() {
    let repo = repository();
    let parent_id = create_parent(&repo).await;
    create_sibling(&repo, &parent_id, "first").await;
    create_sibling(&repo, &parent_id, "second").await;

    let mut ctx = field_ctx(&parent_id, "1");
    let outcome = ModelResources::retrieve_model_field_element(
        &mut ctx,
        &repo,
        &SiblingsAccessor,
        &IndexMatcher,
    )
    .await;

    assert_eq!(outcome.status(), 200);
    assert_eq!(outcome.body().unwrap()["name"], json!("second"));

    let mut ctx = field_ctx(&parent_id, "5");
    let out_of_range = ModelResources::retrieve_model_field_element(
        &mut ctx,
        &repo,
        &SiblingsAccessor,
        &IndexMatcher,
    )
    .await;
    assert_eq!(out_of_range.status(), 404);
    assert_eq!(out_of_range.error().unwrap().code, "dummy_siblings");
}

#[tokio::test]
async fn element_update_preserves_its_id() {
    let repo = repository();
    let parent_id = create_parent(&repo).await;
    let element_id = create_sibling(&repo, &parent_id, "old").await;

    let mut ctx = field_ctx(&parent_id, &element_id);
    let outcome = ModelResources::update_model_field_element(
        json!({ "name": "new" }),
        &mut ctx,
        &repo,
        &repo,
        &SiblingsAccessor,
        &ElementIdMatcher,
    )
    .await;

    assert_eq!(outcome.status(), 200);
    let body = outcome.body().unwrap();
    assert_eq!(body["id"], json!(element_id));
    assert_eq!(body["name"], json!("new"));
}

#[tokio::test]
async fn element_merge_retains_unspecified_fields() {
    let repo = repository();
    let parent_id = create_parent(&repo).await;
    let element_id = create_sibling(&repo, &parent_id, "kept").await;

    let mut ctx = field_ctx(&parent_id, &element_id);
    let outcome = ModelResources::merge_model_field_element(
        json!({}),
        &mut ctx,
        &repo,
        &repo,
        &SiblingsAccessor,
        &ElementIdMatcher,
    )
    .await;

    assert_eq!(outcome.status(), 200);
    assert_eq!(outcome.body().unwrap()["name"], json!("kept"));
}

#[tokio::test]
async fn deleted_element_is_not_found_by_its_id() {
    let repo = repository();
    let parent_id = create_parent(&repo).await;
    let element_id = create_sibling(&repo, &parent_id, "gone").await;

    let mut ctx = field_ctx(&parent_id, &element_id);
    let outcome = ModelResources::delete_model_field_element(
        &mut ctx,
        &repo,
        &repo,
        &SiblingsAccessor,
        &ElementIdMatcher,
    )
    .await;
    assert_eq!(outcome.status(), 204);

    let mut ctx = field_ctx(&parent_id, &element_id);
    let retrieved = ModelResources::retrieve_model_field_element(
        &mut ctx,
        &repo,
        &SiblingsAccessor,
        &ElementIdMatcher,
    )
    .await;
    assert_eq!(retrieved.status(), 404);
    assert_eq!(retrieved.error().unwrap().code, "dummy_siblings");

    // An id never present in the field reports the same not-found code.
    let mut ctx = field_ctx(&parent_id, "never-there");
    let missing = ModelResources::retrieve_model_field_element(
        &mut ctx,
        &repo,
        &SiblingsAccessor,
        &ElementIdMatcher,
    )
    .await;
    assert_eq!(missing.status(), 404);
    assert_eq!(missing.error().unwrap().code, "dummy_siblings");
}

#[tokio::test]
async fn missing_parent_is_coded_to_the_model_name() {
    let repo = repository();

    let mut ctx = field_ctx("no-such-parent", "e1");
    let outcome = ModelResources::retrieve_model_field_element(
        &mut ctx,
        &repo,
        &SiblingsAccessor,
        &ElementIdMatcher,
    )
    .await;

    assert_eq!(outcome.status(), 404);
    assert_eq!(outcome.error().unwrap().code, "dummy");
}

#[tokio::test]
async fn element_delete_revalidates_the_parent() {
    let repo = repository();
    let mut ctx = ModelContext::<Team>::new("");
    let created =
        ModelResources::create_model(json!({ "name": "crew" }), &mut ctx, &repo).await;
    assert_eq!(created.status(), 201);
    let team_id = ctx.id;

    let mut ctx = ModelFieldContext::new(ModelContext::<Team>::new(&team_id), "members", "");
    let added = ModelResources::create_model_field_element(
        json!({ "name": "solo" }),
        &mut ctx,
        &repo,
        &repo,
        &MembersAccessor,
    )
    .await;
    assert_eq!(added.status(), 201);
    let member_id = added.body().unwrap()["id"].as_str().unwrap().to_string();

    // Removing the only member would leave an empty list, which the team
    // rejects; the delete must fail instead of persisting an invalid parent.
    let mut ctx = ModelFieldContext::new(ModelContext::<Team>::new(&team_id), "members", &member_id);
    let outcome = ModelResources::delete_model_field_element(
        &mut ctx,
        &repo,
        &repo,
        &MembersAccessor,
        &ElementIdMatcher,
    )
    .await;
    assert_eq!(outcome.status(), 400);
    assert_eq!(outcome.error().unwrap().code, "team.members");

    let mut ctx = ModelFieldContext::new(ModelContext::<Team>::new(&team_id), "members", &member_id);
    let retrieved = ModelResources::retrieve_model_field_element(
        &mut ctx,
        &repo,
        &MembersAccessor,
        &ElementIdMatcher,
    )
    .await;
    assert_eq!(retrieved.status(), 200);
}

#[tokio::test]
async fn element_create_rejects_null_payload() {
    let repo = repository();
    let parent_id = create_parent(&repo).await;

    let mut ctx = field_ctx(&parent_id, "");
    let outcome = ModelResources::create_model_field_element(
        Value::Null,
        &mut ctx,
        &repo,
        &repo,
        &SiblingsAccessor,
    )
    .await;

    assert_eq!(outcome.status(), 400);
    assert_eq!(outcome.error().unwrap().code, "dummy_siblings");
}
