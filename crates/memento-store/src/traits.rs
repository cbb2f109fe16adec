use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::object::{KeyPage, StoredBlob};

/// Key-value blob store.
///
/// All implementations must satisfy these invariants:
/// - A successful `put` is fully visible to subsequent `get`/`exists` calls.
/// - Writes to the same key are not ordered by the store; the last one wins.
/// - `list_keys` returns keys in ascending lexicographic order.
/// - All backend errors are propagated, never retried or swallowed.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `blob` under `key`.
    async fn put(&self, key: &str, blob: StoredBlob) -> StoreResult<()>;

    /// Read the blob at `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    async fn get(&self, key: &str) -> StoreResult<Option<StoredBlob>>;

    /// Check whether a blob exists at `key`.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Delete the blob at `key`. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// List one page of keys starting with `prefix`, strictly after
    /// `continuation` when given.
    async fn list_keys(&self, prefix: &str, continuation: Option<&str>) -> StoreResult<KeyPage>;

    /// List every key starting with `prefix`, following continuations until
    /// the listing is exhausted.
    async fn list_all_keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let page = self.list_keys(prefix, continuation.as_deref()).await?;
            keys.extend(page.keys);
            match page.continuation {
                Some(next) if continuation.as_deref() == Some(next.as_str()) => {
                    return Err(StoreError::Unavailable(format!(
                        "listing of {prefix:?} did not advance past {next:?}"
                    )));
                }
                Some(next) => continuation = Some(next),
                None => return Ok(keys),
            }
        }
    }
}
