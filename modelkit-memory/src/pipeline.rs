//! Aggregation pipeline execution over in-memory documents.
//!
//! Supports the stages the pipeline builder emits: `$unwind` (with
//! `includeArrayIndex`), `$match`, `$sort`, `$skip`, and `$limit`, executed
//! strictly in pipeline order.

use bson::{Bson, Document};

use modelkit_core::error::{StoreError, StoreResult};

use crate::evaluator::{compare_documents, matches_filter};

/// Runs `pipeline` over `documents`, stage by stage.
pub(crate) fn execute_pipeline(
    documents: Vec<Document>,
    pipeline: &[Document],
) -> StoreResult<Vec<Document>> {
    let mut current = documents;

    for stage in pipeline {
        let mut entries = stage.iter();
        let (Some((op, arg)), None) = (entries.next(), entries.next()) else {
            return Err(StoreError::InvalidDocument(
                "pipeline stage must have exactly one operator".to_string(),
            ));
        };

        current = match op.as_str() {
            "$unwind" => unwind(current, arg)?,
            "$match" => {
                let filter = arg.as_document().ok_or_else(|| {
                    StoreError::InvalidDocument("$match requires a document".to_string())
                })?;
                let mut kept = Vec::with_capacity(current.len());
                for document in current {
                    if matches_filter(&document, filter)? {
                        kept.push(document);
                    }
                }
                kept
            }
            "$sort" => {
                let order = arg.as_document().ok_or_else(|| {
                    StoreError::InvalidDocument("$sort requires a document".to_string())
                })?;
                let mut sorted = current;
                sorted.sort_by(|a, b| compare_documents(a, b, order));
                sorted
            }
            "$skip" => {
                let n = stage_count(arg, "$skip")?;
                current.into_iter().skip(n).collect()
            }
            "$limit" => {
                let n = stage_count(arg, "$limit")?;
                current.into_iter().take(n).collect()
            }
            other => {
                return Err(StoreError::InvalidDocument(format!(
                    "unsupported pipeline stage: {other}",
                )));
            }
        };
    }

    Ok(current)
}

fn stage_count(arg: &Bson, stage: &str) -> StoreResult<usize> {
    arg.as_i64()
        .or_else(|| arg.as_i32().map(i64::from))
        .filter(|n| *n >= 0)
        .map(|n| n as usize)
        .ok_or_else(|| {
            StoreError::InvalidDocument(format!("{stage} requires a non-negative integer"))
        })
}

/// Replaces each document with one copy per element of the array at the
/// unwound path. Documents whose value at the path is missing, null, or an
/// empty array are dropped; a non-array value passes through unchanged with a
/// null index.
fn unwind(documents: Vec<Document>, arg: &Bson) -> StoreResult<Vec<Document>> {
    let spec = arg.as_document().ok_or_else(|| {
        StoreError::InvalidDocument("$unwind requires a document".to_string())
    })?;
    let path = spec
        .get_str("path")
        .ok()
        .and_then(|path| path.strip_prefix('$'))
        .ok_or_else(|| {
            StoreError::InvalidDocument("$unwind requires a $-prefixed path".to_string())
        })?;
    let index_field = spec.get_str("includeArrayIndex").ok();

    let segments = path.split('.').collect::<Vec<_>>();
    let mut unwound = Vec::new();

    for mut document in documents {
        let elements = match get_path(&document, &segments) {
            None | Some(Bson::Null) => continue,
            Some(Bson::Array(elements)) => Some(elements.clone()),
            Some(_) => None,
        };

        match elements {
            Some(elements) => {
                for (i, element) in elements.into_iter().enumerate() {
                    let mut copy = document.clone();
                    set_path(&mut copy, &segments, element);
                    if let Some(index_field) = index_field {
                        copy.insert(index_field, Bson::Int64(i as i64));
                    }
                    unwound.push(copy);
                }
            }
            None => {
                if let Some(index_field) = index_field {
                    document.insert(index_field, Bson::Null);
                }
                unwound.push(document);
            }
        }
    }

    Ok(unwound)
}

fn get_path<'a>(document: &'a Document, segments: &[&str]) -> Option<&'a Bson> {
    let (first, rest) = segments.split_first()?;
    let value = document.get(first)?;

    if rest.is_empty() {
        return Some(value);
    }

    match value {
        Bson::Document(nested) => get_path(nested, rest),
        _ => None,
    }
}

fn set_path(document: &mut Document, segments: &[&str], value: Bson) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        document.insert(*first, value);
        return;
    }

    if let Some(Bson::Document(nested)) = document.get_mut(*first) {
        set_path(nested, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn unwind_replicates_per_element_with_index() {
        let documents = vec![doc! { "name": "p", "siblings": [
            { "id": "a" },
            { "id": "b" },
        ] }];

        let stages = vec![doc! { "$unwind": {
            "path": "$siblings",
            "includeArrayIndex": "siblingsIndex",
        } }];
        let result = execute_pipeline(documents, &stages).unwrap();

        assert_eq!(
            result,
            vec![
                doc! { "name": "p", "siblings": { "id": "a" }, "siblingsIndex": 0_i64 },
                doc! { "name": "p", "siblings": { "id": "b" }, "siblingsIndex": 1_i64 },
            ]
        );
    }

    #[test]
    fn unwind_drops_missing_and_empty_arrays() {
        let documents = vec![
            doc! { "name": "missing" },
            doc! { "name": "empty", "siblings": [] },
            doc! { "name": "null", "siblings": Bson::Null },
        ];

        let stages = vec![doc! { "$unwind": { "path": "$siblings" } }];
        let result = execute_pipeline(documents, &stages).unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn match_sort_skip_limit_run_in_order() {
        let documents = (0..10)
            .map(|i| doc! { "index": i as i64 })
            .collect::<Vec<_>>();

        let stages = vec![
            doc! { "$match": { "index": { "$gte": 2_i64 } } },
            doc! { "$sort": { "index": -1 } },
            doc! { "$limit": 5_i64 },
            doc! { "$skip": 2_i64 },
        ];
        let result = execute_pipeline(documents, &stages).unwrap();

        assert_eq!(
            result,
            vec![doc! { "index": 7_i64 }, doc! { "index": 6_i64 }, doc! { "index": 5_i64 }]
        );
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let result = execute_pipeline(vec![], &[doc! { "$group": { "_id": Bson::Null } }]);

        assert!(result.is_err());
    }
}
