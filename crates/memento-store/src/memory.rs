use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::object::{KeyPage, StoredBlob};
use crate::traits::BlobStore;

/// Default number of keys returned per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// In-memory, `BTreeMap`-based blob store.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock` and
/// cloned on read/write. Keys are kept sorted so listing is a range scan.
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<String, StoredBlob>>,
    page_size: usize,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a store whose listings return at most `page_size` keys per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|m| m.len()).unwrap_or_default()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .map(|m| m.values().map(|b| b.size).sum())
            .unwrap_or_default()
    }

    fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
        StoreError::Unavailable(format!("lock poisoned: {e}"))
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, blob: StoredBlob) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let mut map = self.blobs.write().map_err(Self::poisoned)?;
        map.insert(key.to_string(), blob);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredBlob>> {
        let map = self.blobs.read().map_err(Self::poisoned)?;
        Ok(map.get(key).cloned())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let map = self.blobs.read().map_err(Self::poisoned)?;
        Ok(map.contains_key(key))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut map = self.blobs.write().map_err(Self::poisoned)?;
        Ok(map.remove(key).is_some())
    }

    async fn list_keys(&self, prefix: &str, continuation: Option<&str>) -> StoreResult<KeyPage> {
        let map = self.blobs.read().map_err(Self::poisoned)?;
        let start = match continuation {
            Some(after) => Bound::Excluded(after.to_string()),
            None => Bound::Included(prefix.to_string()),
        };
        let mut matching = map
            .range((start, Bound::Unbounded))
            .map(|(k, _)| k)
            .skip_while(|k| k.as_str() < prefix)
            .take_while(|k| k.starts_with(prefix));

        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let continuation = match matching.next() {
            Some(_) => keys.last().cloned(),
            None => None,
        };
        Ok(KeyPage { keys, continuation })
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .field("page_size", &self.page_size)
            .finish()
    }
}
