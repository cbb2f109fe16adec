//! In-memory index service for testing and ephemeral use.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{IndexError, IndexResult};
use crate::service::{page_of, IndexPage, IndexService};

/// Default number of entries returned per page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// An in-memory implementation of [`IndexService`].
///
/// All records live in a `HashMap` behind a `RwLock`. Data is lost when the
/// service is dropped.
#[derive(Debug)]
pub struct InMemoryIndexService {
    records: RwLock<HashMap<String, BTreeSet<i64>>>,
    page_size: usize,
}

impl InMemoryIndexService {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Serve reads in pages of at most `page_size` entries.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Number of records (resources) held.
    pub fn record_count(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or_default()
    }

    fn poisoned<E: std::fmt::Display>(e: E) -> IndexError {
        IndexError::Unavailable(format!("lock poisoned: {e}"))
    }
}

impl Default for InMemoryIndexService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexService for InMemoryIndexService {
    async fn get(&self, resource_key: &str, after: Option<i64>) -> IndexResult<IndexPage> {
        let records = self.records.read().map_err(Self::poisoned)?;
        Ok(records
            .get(resource_key)
            .map(|set| page_of(set, after, self.page_size))
            .unwrap_or_default())
    }

    async fn merge(&self, resource_key: &str, entries: &BTreeSet<i64>) -> IndexResult<()> {
        let mut records = self.records.write().map_err(Self::poisoned)?;
        records
            .entry(resource_key.to_string())
            .or_default()
            .extend(entries.iter().copied());
        Ok(())
    }

    async fn remove(&self, resource_key: &str, entries: &BTreeSet<i64>) -> IndexResult<()> {
        let mut records = self.records.write().map_err(Self::poisoned)?;
        if let Some(set) = records.get_mut(resource_key) {
            set.retain(|e| !entries.contains(e));
            if set.is_empty() {
                records.remove(resource_key);
            }
        }
        Ok(())
    }
}
