//! Pagination primitives.

use serde::Serialize;

/// One page of results plus an optional continuation token.
///
/// The token is present when the page is exactly as long as the requested
/// limit, meaning more results may exist. It identifies the last item of the
/// page and is passed back as the `after` reference of the next call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: Option<String>) -> Self {
        Self { items, next }
    }

    /// Whether a follow-up request could return more results.
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}
