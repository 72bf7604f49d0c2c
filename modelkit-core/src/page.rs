//! Page results for bounded slices of a larger result set.

use bson::{Document, doc};

/// A bounded slice of a larger result set plus the total match count.
///
/// `total` always reflects the full-query match count, never the size of the
/// returned slice, and `offset` echoes the requested skip even when it lies
/// past the end of the result set.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPage {
    /// The requested skip.
    pub offset: u64,
    /// Total number of documents matching the query.
    pub total: u64,
    /// Key under which the slice appears in the rendered page document.
    pub result_key: String,
    /// The documents in this slice.
    pub documents: Vec<Document>,
}

impl DocumentPage {
    pub fn new(
        offset: u64,
        total: u64,
        result_key: impl Into<String>,
        documents: Vec<Document>,
    ) -> Self {
        DocumentPage { offset, total, result_key: result_key.into(), documents }
    }

    /// An empty page: the requested offset, the full match count, no slice.
    pub fn empty(offset: u64, total: u64, result_key: impl Into<String>) -> Self {
        Self::new(offset, total, result_key, Vec::new())
    }

    /// Renders this page as `{offset, total, <resultKey>: [...]}`.
    ///
    /// The result key is omitted entirely when the slice is empty; consumers
    /// rely on the absence of the key, never on an empty array.
    pub fn to_document(&self) -> Document {
        let mut page = doc! {
            "offset": self.offset as i64,
            "total": self.total as i64,
        };

        if !self.documents.is_empty() {
            page.insert(&self.result_key, self.documents.clone());
        }

        page
    }
}
