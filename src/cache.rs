use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{PhotoItem, SearchQuery};

/// In-memory cache of decoded search results, keyed by exact query string.
/// Entries are only ever written with a complete, successfully decoded result
/// and live as long as the cache does.
///
/// Not synchronized; the owner serializes access.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<SearchQuery, Arc<Vec<PhotoItem>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, query: &SearchQuery) -> Option<Arc<Vec<PhotoItem>>> {
        self.entries.get(query).cloned()
    }

    /// Stores the result for `query`, replacing any earlier entry.
    pub fn store(&mut self, query: SearchQuery, items: Arc<Vec<PhotoItem>>) {
        self.entries.insert(query, items);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
