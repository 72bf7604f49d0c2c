//! Incremental construction of document filter expressions.
//!
//! [`FilterBuilder`] accumulates clauses into a single filter document. Every
//! `with_*` method is a no-op when given a `None`, empty, or blank input, so
//! optional search parameters can be chained without guarding each one:
//!
//! ```ignore
//! use modelkit_core::query::FilterBuilder;
//!
//! let filter = FilterBuilder::new()
//!     .with_eq_or_regex("name", params.name.as_deref())
//!     .with_range("age", params.min_age, params.max_age)
//!     .with_exists("email", params.has_email)
//!     .build();
//! ```
//!
//! String values wrapped in `/…/` delimiters are treated as regular
//! expression patterns; everything else is matched by equality. The values
//! `"/"` and `"//"` are too short to contain a pattern and stay literal.

use bson::{Bson, Document, doc};

/// Builds a single document-filter expression from already-validated inputs.
///
/// An empty builder produces an empty filter, which matches every document.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    filter: Document,
}

impl FilterBuilder {
    /// Creates a new builder with no clauses.
    pub fn new() -> Self {
        FilterBuilder { filter: Document::new() }
    }

    fn add(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.filter.insert(field, value.into());
        self
    }

    /// Adds `{field: {$regex: pattern}}`; no-op if the pattern is blank.
    pub fn with_regex(self, field: &str, pattern: &str) -> Self {
        if pattern.trim().is_empty() {
            return self;
        }

        self.add(field, doc! { "$regex": pattern })
    }

    /// For an array-valued field, requires every pattern to match some
    /// element: `{field: {$all: [{$elemMatch: {$regex: p}}, …]}}`.
    ///
    /// No-op if no non-blank pattern remains.
    pub fn with_all_regex(self, field: &str, patterns: &[String]) -> Self {
        let clauses = patterns
            .iter()
            .filter(|pattern| !pattern.trim().is_empty())
            .map(|pattern| Bson::Document(doc! { "$elemMatch": { "$regex": pattern } }))
            .collect::<Vec<_>>();

        if clauses.is_empty() {
            return self;
        }

        self.add(field, doc! { "$all": clauses })
    }

    /// Adds `{field: value}` verbatim; an explicit `Bson::Null` is stored as
    /// such, not dropped.
    pub fn with(self, field: &str, value: impl Into<Bson>) -> Self {
        self.add(field, value)
    }

    /// Adds an equality clause, or a regex clause when the value is wrapped
    /// in `/…/` delimiters. No-op for `None` or blank values.
    pub fn with_eq_or_regex(self, field: &str, value: Option<&str>) -> Self {
        let Some(value) = value else {
            return self;
        };
        if value.trim().is_empty() {
            return self;
        }

        match regex_pattern(value) {
            Some(pattern) => self.add(field, doc! { "$regex": pattern }),
            None => self.add(field, value),
        }
    }

    /// Per-element equality-or-regex over an array-valued field, as an
    /// `$all` of literals and `$elemMatch` regex clauses.
    ///
    /// `None` elements are skipped; no-op when nothing remains.
    pub fn with_all_eq_or_regex(self, field: &str, values: &[Option<String>]) -> Self {
        let clauses = values
            .iter()
            .flatten()
            .map(|value| eq_or_regex_element(value))
            .collect::<Vec<_>>();

        if clauses.is_empty() {
            return self;
        }

        self.add(field, doc! { "$all": clauses })
    }

    /// Adds `{field: {$gte: min}}`, `{field: {$lte: max}}`, both, or nothing.
    pub fn with_range(
        self,
        field: &str,
        min: Option<impl Into<Bson>>,
        max: Option<impl Into<Bson>>,
    ) -> Self {
        let mut bounds = Document::new();

        if let Some(min) = min {
            bounds.insert("$gte", min.into());
        }
        if let Some(max) = max {
            bounds.insert("$lte", max.into());
        }

        if bounds.is_empty() {
            return self;
        }

        self.add(field, bounds)
    }

    /// Adds an existence clause.
    ///
    /// `None` is a no-op. `Some(false)` emits `{field: null}`, which matches
    /// documents where the field is missing or null. `Some(true)` emits
    /// `{field: {$exists: true, $ne: null}}`.
    pub fn with_exists(self, field: &str, exists: Option<bool>) -> Self {
        match exists {
            None => self,
            Some(false) => self.add(field, Bson::Null),
            Some(true) => self.add(field, doc! { "$exists": true, "$ne": Bson::Null }),
        }
    }

    /// Per-element equality-or-regex against a sub-field of each element of
    /// an array-valued field.
    ///
    /// `None` elements are skipped; no-op when nothing remains.
    pub fn with_element_eq_or_regex(
        self,
        field: &str,
        sub_field: &str,
        values: &[Option<String>],
    ) -> Self {
        let clauses = values
            .iter()
            .flatten()
            .map(|value| {
                Bson::Document(doc! { "$elemMatch": { sub_field: eq_or_regex_value(value) } })
            })
            .collect::<Vec<_>>();

        if clauses.is_empty() {
            return self;
        }

        self.add(field, doc! { "$all": clauses })
    }

    /// Adds `{field: null}` for `None`, otherwise dispatches to the
    /// equality-or-regex logic of [`FilterBuilder::with_eq_or_regex`].
    pub fn with_null_or_eq_or_regex(self, field: &str, value: Option<&str>) -> Self {
        match value {
            None => self.add(field, Bson::Null),
            Some(value) => self.with_eq_or_regex(field, Some(value)),
        }
    }

    /// Returns the accumulated filter document.
    pub fn build(self) -> Document {
        self.filter
    }
}

/// Extracts the inner pattern of a `/…/`-delimited value.
///
/// Values shorter than three characters (`"/"`, `"//"`) cannot contain a
/// pattern and are treated as literals.
fn regex_pattern(value: &str) -> Option<&str> {
    if value.len() >= 3 && value.starts_with('/') && value.ends_with('/') {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

fn eq_or_regex_element(value: &str) -> Bson {
    match regex_pattern(value) {
        Some(pattern) => Bson::Document(doc! { "$elemMatch": { "$regex": pattern } }),
        None => Bson::String(value.to_string()),
    }
}

fn eq_or_regex_value(value: &str) -> Bson {
    match regex_pattern(value) {
        Some(pattern) => Bson::Document(doc! { "$regex": pattern }),
        None => Bson::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_or_regex_extracts_delimited_pattern() {
        let filter = FilterBuilder::new()
            .with_eq_or_regex("name", Some("/abc/"))
            .build();

        assert_eq!(filter, doc! { "name": { "$regex": "abc" } });
    }

    #[test]
    fn eq_or_regex_keeps_plain_value_literal() {
        let filter = FilterBuilder::new()
            .with_eq_or_regex("name", Some("abc"))
            .build();

        assert_eq!(filter, doc! { "name": "abc" });
    }

    #[test]
    fn eq_or_regex_treats_short_values_as_literals() {
        let slash = FilterBuilder::new()
            .with_eq_or_regex("name", Some("/"))
            .build();
        let double_slash = FilterBuilder::new()
            .with_eq_or_regex("name", Some("//"))
            .build();

        assert_eq!(slash, doc! { "name": "/" });
        assert_eq!(double_slash, doc! { "name": "//" });
    }

    #[test]
    fn blank_and_none_inputs_are_no_ops() {
        let filter = FilterBuilder::new()
            .with_regex("a", "  ")
            .with_eq_or_regex("b", None)
            .with_eq_or_regex("c", Some(""))
            .with_all_regex("d", &[])
            .with_range("e", None::<i64>, None::<i64>)
            .with_exists("f", None)
            .build();

        assert!(filter.is_empty());
    }

    #[test]
    fn with_stores_explicit_null() {
        let filter = FilterBuilder::new().with("deleted", Bson::Null).build();

        assert_eq!(filter, doc! { "deleted": Bson::Null });
    }

    #[test]
    fn range_emits_requested_bounds() {
        let both = FilterBuilder::new()
            .with_range("age", Some(18), Some(65))
            .build();
        let min_only = FilterBuilder::new()
            .with_range("age", Some(18), None::<i32>)
            .build();

        assert_eq!(both, doc! { "age": { "$gte": 18, "$lte": 65 } });
        assert_eq!(min_only, doc! { "age": { "$gte": 18 } });
    }

    #[test]
    fn exists_clauses_take_the_expected_shapes() {
        let absent = FilterBuilder::new()
            .with_exists("email", Some(false))
            .build();
        let present = FilterBuilder::new()
            .with_exists("email", Some(true))
            .build();

        assert_eq!(absent, doc! { "email": Bson::Null });
        assert_eq!(present, doc! { "email": { "$exists": true, "$ne": Bson::Null } });
    }

    #[test]
    fn all_eq_or_regex_skips_none_elements() {
        let filter = FilterBuilder::new()
            .with_all_eq_or_regex(
                "tags",
                &[Some("rust".to_string()), None, Some("/we.+/".to_string())],
            )
            .build();

        assert_eq!(
            filter,
            doc! { "tags": { "$all": [
                "rust",
                { "$elemMatch": { "$regex": "we.+" } },
            ] } }
        );
    }

    #[test]
    fn element_eq_or_regex_targets_sub_field() {
        let filter = FilterBuilder::new()
            .with_element_eq_or_regex("siblings", "name", &[Some("/jo.*/".to_string())])
            .build();

        assert_eq!(
            filter,
            doc! { "siblings": { "$all": [
                { "$elemMatch": { "name": { "$regex": "jo.*" } } },
            ] } }
        );
    }

    #[test]
    fn null_or_eq_or_regex_emits_null_for_none() {
        let filter = FilterBuilder::new()
            .with_null_or_eq_or_regex("parent", None)
            .build();

        assert_eq!(filter, doc! { "parent": Bson::Null });
    }
}
