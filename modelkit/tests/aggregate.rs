mod support;

use modelkit::{
    aggregate::PipelineBuilder,
    backend::DocumentBackend,
    bson::doc,
    memory::MemoryStore,
    query::FilterBuilder,
};

#[tokio::test]
async fn unwind_match_sort_pages_over_nested_elements() {
    let store = MemoryStore::new();
    store
        .insert_document(
            "dummies",
            doc! { "name": "p1", "siblings": [
                { "id": "a", "name": "sam" },
                { "id": "b", "name": "jo" },
            ] },
        )
        .await
        .unwrap();
    store
        .insert_document(
            "dummies",
            doc! { "name": "p2", "siblings": [
                { "id": "c", "name": "sue" },
            ] },
        )
        .await
        .unwrap();
    store
        .insert_document("dummies", doc! { "name": "p3" })
        .await
        .unwrap();

    let pipeline = PipelineBuilder::new()
        .unwind("siblings")
        .match_stage(
            FilterBuilder::new()
                .with_eq_or_regex("siblings.name", Some("/^s/"))
                .build(),
        )
        .sort(doc! { "siblings.name": 1 }, 0, 10)
        .build();
    let result = store.aggregate_documents("dummies", pipeline).await.unwrap();

    let names = result
        .iter()
        .map(|d| {
            d.get_document("siblings")
                .unwrap()
                .get_str("name")
                .unwrap()
        })
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["sam", "sue"]);

    // Each unwound document records its element's position.
    assert_eq!(result[0].get_i64("siblingsIndex").unwrap(), 0);
}

#[tokio::test]
async fn sort_stage_skips_after_limiting() {
    let store = MemoryStore::new();
    for i in 0..6_i64 {
        store
            .insert_document("dummies", doc! { "name": "p", "siblings": [{ "index": i }] })
            .await
            .unwrap();
    }

    let pipeline = PipelineBuilder::new()
        .unwind("siblings")
        .sort(doc! { "siblings.index": 1 }, 2, 2)
        .build();
    let result = store.aggregate_documents("dummies", pipeline).await.unwrap();

    let indices = result
        .iter()
        .map(|d| d.get_document("siblings").unwrap().get_i64("index").unwrap())
        .collect::<Vec<_>>();
    assert_eq!(indices, vec![2, 3]);
}
