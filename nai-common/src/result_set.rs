use std::sync::Arc;

use crate::PodcastSummary;

/// Keep only podcasts that link to a web page, preserving response order.
pub fn keep_linked(results: Vec<PodcastSummary>) -> Vec<PodcastSummary> {
    results.into_iter().filter(PodcastSummary::has_page).collect()
}

/// The ordered list of podcasts currently on screen.
///
/// Cloning shares the underlying slice. A new search always builds a new
/// slice, so a set handed to a reader never changes underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultSet {
    items: Arc<[PodcastSummary]>,
}

impl Default for SearchResultSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl SearchResultSet {
    pub fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }

    /// Build a displayable set from raw search results.
    pub fn from_results(results: Vec<PodcastSummary>) -> Self {
        Self {
            items: Arc::from(keep_linked(results)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PodcastSummary> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PodcastSummary> {
        self.items.iter()
    }

    /// Split into display rows of `width` items; the last row may be short.
    pub fn rows(&self, width: usize) -> std::slice::Chunks<'_, PodcastSummary> {
        self.items.chunks(width.max(1))
    }

    /// Whether both sets share the same backing slice.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}
