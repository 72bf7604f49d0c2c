//! Ordered aggregation pipelines for querying inside nested arrays.
//!
//! [`PipelineBuilder`] produces the stage sequence used to page over elements
//! of list-valued fields: unwind the path one segment at a time, filter the
//! flattened stream, then sort and slice it.

use bson::{Document, doc};

/// Splits a dotted element path into its trimmed, non-empty segments.
///
/// `"a. b ..c"` yields `["a", "b", "c"]`.
pub fn split_element_path(path: &str) -> Vec<&str> {
    path.split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Builds an aggregation pipeline stage by stage, preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    stages: Vec<Document>,
}

impl PipelineBuilder {
    /// Creates a builder with no stages.
    pub fn new() -> Self {
        PipelineBuilder { stages: Vec::new() }
    }

    /// Appends one `$unwind` stage per path prefix of the dotted `path`.
    ///
    /// For `"a.b"` this unwinds `$a` (recording each element's position as
    /// `aIndex`) and then `$a.b` (recording `bIndex`). Documents whose
    /// unwound field is missing or an empty array are dropped.
    pub fn unwind(self, path: &str) -> Self {
        self.unwind_segments(&split_element_path(path))
    }

    /// Appends `$unwind` stages for an already-split path.
    pub fn unwind_segments(mut self, segments: &[&str]) -> Self {
        for (i, segment) in segments.iter().enumerate() {
            let prefix = segments[..=i].join(".");
            self.stages.push(doc! {
                "$unwind": {
                    "path": format!("${prefix}"),
                    "includeArrayIndex": format!("{segment}Index"),
                }
            });
        }
        self
    }

    /// Appends a `$match` stage; no-op when the filter is empty.
    pub fn match_stage(mut self, filter: Document) -> Self {
        if filter.is_empty() {
            return self;
        }

        self.stages.push(doc! { "$match": filter });
        self
    }

    /// Appends the sorting and slicing tail of the pipeline.
    ///
    /// The `$limit` stage precedes `$skip` and is set to `skip + limit`, so it
    /// caps the documents considered rather than the documents returned; the
    /// `$skip` stage then drops the leading `skip`. An empty `order` emits no
    /// `$sort` stage.
    pub fn sort(mut self, order: Document, skip: u64, limit: u64) -> Self {
        if !order.is_empty() {
            self.stages.push(doc! { "$sort": order });
        }

        self.stages.push(doc! { "$limit": (skip + limit) as i64 });
        if skip > 0 {
            self.stages.push(doc! { "$skip": skip as i64 });
        }
        self
    }

    /// Returns the accumulated stages.
    pub fn build(self) -> Vec<Document> {
        self.stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trims_and_drops_empty_segments() {
        assert_eq!(split_element_path("a. b ..c"), vec!["a", "b", "c"]);
        assert_eq!(split_element_path(""), Vec::<&str>::new());
    }

    #[test]
    fn unwind_emits_one_stage_per_prefix() {
        let stages = PipelineBuilder::new().unwind("a.b").build();

        assert_eq!(
            stages,
            vec![
                doc! { "$unwind": { "path": "$a", "includeArrayIndex": "aIndex" } },
                doc! { "$unwind": { "path": "$a.b", "includeArrayIndex": "bIndex" } },
            ]
        );
    }

    #[test]
    fn empty_match_is_dropped() {
        let stages = PipelineBuilder::new().match_stage(Document::new()).build();

        assert!(stages.is_empty());
    }

    #[test]
    fn sort_caps_before_skipping() {
        let stages = PipelineBuilder::new()
            .sort(doc! { "name": 1 }, 10, 5)
            .build();

        assert_eq!(
            stages,
            vec![
                doc! { "$sort": { "name": 1 } },
                doc! { "$limit": 15_i64 },
                doc! { "$skip": 10_i64 },
            ]
        );
    }

    #[test]
    fn sort_without_order_or_skip_emits_limit_only() {
        let stages = PipelineBuilder::new().sort(Document::new(), 0, 20).build();

        assert_eq!(stages, vec![doc! { "$limit": 20_i64 }]);
    }
}
