mod support;

use modelkit::{
    backend::{DocumentBackend, ID_KEY},
    bson::{Bson, doc},
    error::StoreError,
    memory::MemoryStore,
    repository::{Repository, SCHEMA_VERSION_KEY},
};

use support::{Dummy, SCHEMA_VERSION};

fn repo_on(store: &MemoryStore) -> Repository<MemoryStore> {
    Repository::new(store.clone(), SCHEMA_VERSION)
}

#[tokio::test]
async fn migrate_stamps_and_compacts_every_document() {
    let store = MemoryStore::new();
    for i in 0..10_i64 {
        store
            .insert_document("dummies", doc! { "index": i, "name": format!("d{i}"), "legacy": "x" })
            .await
            .unwrap();
    }

    let repo = repo_on(&store);
    let migrated = repo.migrate_collection::<Dummy>("dummies").await.unwrap();
    assert_eq!(migrated, 10);

    let documents = store
        .find_documents("dummies", doc! {}, Default::default())
        .await
        .unwrap();
    assert_eq!(documents.len(), 10);
    for document in &documents {
        assert_eq!(document.get_str(SCHEMA_VERSION_KEY).unwrap(), SCHEMA_VERSION);
        assert!(document.get("legacy").is_none());
        assert!(document.get(ID_KEY).is_some());
    }

    let outdated = store
        .count_documents("dummies", doc! { SCHEMA_VERSION_KEY: { "$ne": SCHEMA_VERSION } })
        .await
        .unwrap();
    assert_eq!(outdated, 0);
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let store = MemoryStore::new();
    for i in 0..4_i64 {
        store
            .insert_document("dummies", doc! { "index": i, "name": format!("d{i}") })
            .await
            .unwrap();
    }

    let repo = repo_on(&store);
    assert_eq!(repo.migrate_collection::<Dummy>("dummies").await.unwrap(), 4);
    assert_eq!(repo.migrate_collection::<Dummy>("dummies").await.unwrap(), 0);
}

#[tokio::test]
async fn migrate_accepts_heterogeneous_legacy_version_shapes() {
    let store = MemoryStore::new();
    let legacy_versions = vec![
        Bson::Int32(1),
        Bson::String("old".to_string()),
        Bson::Array(vec![Bson::Int32(1)]),
        Bson::Document(doc! { "v": 1 }),
    ];
    for (i, version) in legacy_versions.into_iter().enumerate() {
        store
            .insert_document(
                "dummies",
                doc! { "index": i as i64, "name": format!("d{i}"), SCHEMA_VERSION_KEY: version },
            )
            .await
            .unwrap();
    }

    let repo = repo_on(&store);
    assert_eq!(repo.migrate_collection::<Dummy>("dummies").await.unwrap(), 4);
}

#[tokio::test]
async fn restamp_keeps_fields_the_model_does_not_define() {
    let store = MemoryStore::new();
    store
        .insert_document("dummies", doc! { "name": "d", "legacy": "kept" })
        .await
        .unwrap();

    let repo = repo_on(&store);
    assert_eq!(repo.restamp_collection("dummies").await.unwrap(), 1);

    let document = store
        .find_one_document("dummies", doc! {}, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(document.get_str(SCHEMA_VERSION_KEY).unwrap(), SCHEMA_VERSION);
    assert_eq!(document.get_str("legacy").unwrap(), "kept");
}

#[tokio::test]
async fn undecodable_document_aborts_the_migration() {
    let store = MemoryStore::new();
    // Missing the required `name` field.
    store
        .insert_document("dummies", doc! { "index": 1_i64 })
        .await
        .unwrap();

    let repo = repo_on(&store);
    let result = repo.migrate_collection::<Dummy>("dummies").await;

    assert!(matches!(result, Err(StoreError::Migration(_))));
}
