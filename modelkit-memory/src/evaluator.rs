//! Operator-document filter evaluation for in-memory filtering.
//!
//! Interprets the filter convention shared by every backend: `{field: value}`
//! for equality, `{field: {"$op": arg}}` for operators. Dotted paths fan out
//! through arrays of embedded documents, and a `null` condition matches
//! documents where the field is missing or null.

use std::{cmp::Ordering, collections::HashMap};

use bson::{Bson, Document, datetime::DateTime};
use regex::Regex;

use modelkit_core::error::{StoreError, StoreResult};

/// Type-erased, comparable representation of BSON values.
///
/// Normalizes all numeric types to f64 so mixed int/double data compares the
/// way callers expect. Values of other BSON types are not ordered.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => {
                Comparable::Array(arr.iter().map(Comparable::from).collect::<Vec<_>>())
            }
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null,
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Returns whether `document` satisfies every clause of `filter`.
pub(crate) fn matches_filter(document: &Document, filter: &Document) -> StoreResult<bool> {
    for (path, condition) in filter {
        if !field_matches(document, path, condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Orders two documents by the given sort specification; ties and
/// incomparable values compare equal.
pub(crate) fn compare_documents(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (path, direction) in sort {
        let left = first_value(a, path).map(Comparable::from).unwrap_or(Comparable::Null);
        let right = first_value(b, path).map(Comparable::from).unwrap_or(Comparable::Null);

        let descending = matches!(Comparable::from(direction), Comparable::Number(n) if n < 0.0);
        let ordering = if descending {
            right.partial_cmp(&left)
        } else {
            left.partial_cmp(&right)
        };

        match ordering {
            Some(Ordering::Equal) | None => continue,
            Some(ordering) => return ordering,
        }
    }
    Ordering::Equal
}

fn field_matches(document: &Document, path: &str, condition: &Bson) -> StoreResult<bool> {
    let segments = path.split('.').collect::<Vec<_>>();
    let mut values = Vec::new();
    resolve_path(document, &segments, &mut values);

    match operator_document(condition) {
        Some(operators) => {
            for (op, arg) in operators {
                if !operator_matches(op, arg, &values)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        None => Ok(eq_matches(&values, condition)),
    }
}

/// A condition document counts as operators only when every key is one;
/// `{a: 1}` is an equality match against an embedded document.
fn operator_document(condition: &Bson) -> Option<&Document> {
    condition
        .as_document()
        .filter(|doc| !doc.is_empty() && doc.keys().all(|key| key.starts_with('$')))
}

/// Collects the values reachable at a dotted path, fanning out through
/// arrays of embedded documents.
fn resolve_path<'a>(document: &'a Document, segments: &[&str], out: &mut Vec<&'a Bson>) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let Some(value) = document.get(first) else {
        return;
    };

    if rest.is_empty() {
        out.push(value);
        return;
    }

    match value {
        Bson::Document(nested) => resolve_path(nested, rest, out),
        Bson::Array(elements) => {
            for element in elements {
                if let Bson::Document(nested) = element {
                    resolve_path(nested, rest, out);
                }
            }
        }
        _ => {}
    }
}

fn first_value<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let segments = path.split('.').collect::<Vec<_>>();
    let mut values = Vec::new();
    resolve_path(document, &segments, &mut values);
    values.first().copied()
}

fn operator_matches(op: &str, arg: &Bson, values: &[&Bson]) -> StoreResult<bool> {
    match op {
        "$eq" => Ok(eq_matches(values, arg)),
        "$ne" => Ok(!eq_matches(values, arg)),
        "$gt" => Ok(compare_matches(values, arg, |o| o == Ordering::Greater)),
        "$gte" => Ok(compare_matches(values, arg, |o| o != Ordering::Less)),
        "$lt" => Ok(compare_matches(values, arg, |o| o == Ordering::Less)),
        "$lte" => Ok(compare_matches(values, arg, |o| o != Ordering::Greater)),
        "$exists" => {
            let wanted = arg.as_bool().unwrap_or(true);
            Ok(!values.is_empty() == wanted)
        }
        "$regex" => {
            let pattern = arg.as_str().ok_or_else(|| {
                StoreError::InvalidDocument("$regex requires a string pattern".to_string())
            })?;
            let regex = Regex::new(pattern)
                .map_err(|e| StoreError::InvalidDocument(format!("invalid pattern: {e}")))?;
            Ok(values.iter().any(|value| regex_matches(value, &regex)))
        }
        "$all" => {
            let required = arg.as_array().ok_or_else(|| {
                StoreError::InvalidDocument("$all requires an array".to_string())
            })?;
            all_matches(values, required)
        }
        "$elemMatch" => elem_matches(values, arg),
        other => Err(StoreError::InvalidDocument(format!(
            "unsupported filter operator: {other}",
        ))),
    }
}

/// Equality over the resolved values: a `null` target also matches a missing
/// field, and an array field matches when it contains the target.
fn eq_matches(values: &[&Bson], target: &Bson) -> bool {
    if matches!(target, Bson::Null) && values.is_empty() {
        return true;
    }

    values.iter().any(|value| equality(value, target))
}

fn equality(value: &Bson, target: &Bson) -> bool {
    if scalar_eq(value, target) {
        return true;
    }

    if let Bson::Array(elements) = value {
        return elements.iter().any(|element| scalar_eq(element, target));
    }

    false
}

fn scalar_eq(a: &Bson, b: &Bson) -> bool {
    if a == b {
        return true;
    }

    // Mixed int/double equality.
    matches!(
        (Comparable::from(a), Comparable::from(b)),
        (Comparable::Number(x), Comparable::Number(y)) if x == y
    )
}

fn compare_matches(values: &[&Bson], target: &Bson, pred: impl Fn(Ordering) -> bool) -> bool {
    let target = Comparable::from(target);

    values.iter().any(|value| {
        Comparable::from(*value)
            .partial_cmp(&target)
            .map(&pred)
            .unwrap_or(false)
    })
}

fn regex_matches(value: &Bson, regex: &Regex) -> bool {
    match value {
        Bson::String(s) => regex.is_match(s),
        Bson::Array(elements) => elements
            .iter()
            .any(|element| matches!(element, Bson::String(s) if regex.is_match(s))),
        _ => false,
    }
}

fn all_matches(values: &[&Bson], required: &[Bson]) -> StoreResult<bool> {
    for item in required {
        let satisfied = match item.as_document().and_then(|doc| doc.get("$elemMatch")) {
            Some(condition) => elem_matches(values, condition)?,
            None => values.iter().any(|value| equality(value, item)),
        };

        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn elem_matches(values: &[&Bson], condition: &Bson) -> StoreResult<bool> {
    let condition = condition.as_document().ok_or_else(|| {
        StoreError::InvalidDocument("$elemMatch requires a document".to_string())
    })?;

    for value in values {
        if let Bson::Array(elements) = value {
            for element in elements {
                if element_matches(element, condition)? {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}

fn element_matches(element: &Bson, condition: &Document) -> StoreResult<bool> {
    if condition.keys().all(|key| key.starts_with('$')) {
        // Operators applied to the element itself, e.g. {$regex: "..."}.
        for (op, arg) in condition {
            if !operator_matches(op, arg, &[element])? {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    match element {
        Bson::Document(nested) => matches_filter(nested, condition),
        _ => Ok(false),
    }
}
