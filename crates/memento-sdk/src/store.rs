use std::sync::Arc;

use memento_index::{floor_in, IndexService, InMemoryIndexService, VersionIndex};
use memento_snapshot::{extract, BodyCodec, JsonBodyCodec, MetadataBundle, Snapshot, StatementGraph};
use memento_store::{BlobStore, InMemoryBlobStore, StoredBlob};
use memento_types::{KeyCodec, ResourceId, Timestamp, VersionKey, VersionRange};

use crate::config::MementoConfig;
use crate::error::{MementoError, MementoResult};
use crate::memento::{Memento, PutReceipt};

/// Versioned snapshot storage over a blob store and a version index.
///
/// Cloning is cheap; clones share both backends.
#[derive(Clone)]
pub struct MementoStore {
    blobs: Arc<dyn BlobStore>,
    index: VersionIndex,
    keys: KeyCodec,
    body: Arc<dyn BodyCodec>,
}

impl std::fmt::Debug for MementoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MementoStore")
            .field("keys", &self.keys)
            .field("media_type", &self.body.media_type())
            .finish_non_exhaustive()
    }
}

impl MementoStore {
    pub fn new(blobs: Arc<dyn BlobStore>, index: Arc<dyn IndexService>, config: &MementoConfig) -> Self {
        let keys = config.key_codec();
        Self {
            blobs,
            index: VersionIndex::new(index, keys.clone()),
            keys,
            body: Arc::new(JsonBodyCodec),
        }
    }

    /// A store backed entirely by memory, with default settings.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(InMemoryIndexService::new()),
            &MementoConfig::default(),
        )
    }

    /// Replace the body serialization.
    pub fn with_body_codec(mut self, body: Arc<dyn BodyCodec>) -> Self {
        self.body = body;
        self
    }

    pub fn key_codec(&self) -> &KeyCodec {
        &self.keys
    }

    pub fn body_codec(&self) -> &dyn BodyCodec {
        self.body.as_ref()
    }

    // ---- Write operations ----

    /// Store `snapshot` as an immutable version keyed by its modification
    /// time (truncated to whole seconds).
    ///
    /// Nothing is written if the snapshot is malformed or a version already
    /// exists at that second. The blob is written before the timestamp is
    /// indexed; if indexing then fails, the receipt carries the error and
    /// the blob remains as an orphan.
    pub async fn put(&self, snapshot: &Snapshot) -> MementoResult<PutReceipt> {
        let metadata = extract(snapshot)?;
        let body = self.body.encode(&snapshot.statements)?;

        let timestamp = snapshot.timestamp();
        let key = VersionKey::new(snapshot.id.clone(), timestamp);
        let storage_key = self.keys.encode(&snapshot.id, Some(timestamp));

        if self.blobs.exists(&storage_key).await? {
            return Err(MementoError::VersionExists(key));
        }

        let blob = StoredBlob::new(body, self.body.media_type(), metadata.into_map());
        let size = blob.size;
        self.blobs.put(&storage_key, blob).await?;
        tracing::debug!(key = %storage_key, size, "wrote memento blob");

        let index_error = match self.index.record(&snapshot.id, timestamp).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    key = %storage_key,
                    error = %e,
                    "memento written but not indexed; blob is orphaned until the index is rebuilt"
                );
                Some(e)
            }
        };

        tracing::info!(resource = %snapshot.id, at = %timestamp, "stored memento");
        Ok(PutReceipt {
            key,
            storage_key,
            index_error,
        })
    }

    /// Derive a snapshot from a raw statement graph and store it.
    pub async fn put_graph(&self, graph: StatementGraph) -> MementoResult<PutReceipt> {
        let snapshot = graph.into_snapshot()?;
        self.put(&snapshot).await
    }

    /// Remove the version of `id` stored at `at`.
    ///
    /// The timeline entry goes first so that a failure between the two steps
    /// leaves at worst an unreferenced blob. Returns whether a blob existed.
    pub async fn delete(&self, id: &ResourceId, at: Timestamp) -> MementoResult<bool> {
        self.index.remove(id, at).await?;
        let storage_key = self.keys.encode(id, Some(at));
        let existed = self.blobs.delete(&storage_key).await?;
        tracing::info!(resource = %id, at = %at, existed, "deleted memento");
        Ok(existed)
    }

    /// Re-derive the timeline of `id` from the blob keys present in the
    /// store. Returns the number of versions found.
    pub async fn rebuild_index(&self, id: &ResourceId) -> MementoResult<usize> {
        let namespace = self.keys.namespace(id);
        let keys = self.blobs.list_all_keys(&namespace).await?;
        let found: Vec<Timestamp> = keys
            .iter()
            .filter_map(|key| {
                let ts = KeyCodec::decode(key)?;
                // Another resource's id may extend this namespace.
                (self.keys.encode(id, Some(ts)) == *key).then_some(ts)
            })
            .collect();
        let count = found.len();
        self.index.record_all(id, found).await?;
        tracing::info!(resource = %id, versions = count, "rebuilt version index");
        Ok(count)
    }

    // ---- Read operations ----

    /// The version of `id` in effect at `at`: an exact match if one exists,
    /// otherwise the latest version stored before `at`.
    ///
    /// A resource with no timeline is answered without touching the blob
    /// store. A timeline entry whose blob is missing is reported as not found.
    ///
    /// The exact key is tried before the timeline is consulted, so a blob
    /// stored at exactly `at` but never indexed (see [`PutReceipt`]) is
    /// returned when the resource has at least one other indexed version, and
    /// not found when it has none. Use [`Self::get_exact`] to reach such a
    /// blob regardless, or [`Self::rebuild_index`] to index it.
    pub async fn get(&self, id: &ResourceId, at: Timestamp) -> MementoResult<Option<Memento>> {
        let timeline = self.index.timeline(id).await?;
        if timeline.is_empty() {
            tracing::debug!(resource = %id, "no versions recorded");
            return Ok(None);
        }

        if let Some(memento) = self.get_exact(id, at).await? {
            return Ok(Some(memento));
        }

        let Some(resolved) = floor_in(&timeline, at) else {
            tracing::debug!(resource = %id, at = %at, "requested time precedes first version");
            return Ok(None);
        };
        if resolved == at {
            tracing::warn!(resource = %id, at = %at, "index lists a version whose blob is missing");
            return Ok(None);
        }

        let found = self.get_exact(id, resolved).await?;
        if found.is_none() {
            tracing::warn!(resource = %id, at = %resolved, "index lists a version whose blob is missing");
        }
        Ok(found)
    }

    /// Read the version stored at exactly `at`, bypassing the index.
    pub async fn get_exact(&self, id: &ResourceId, at: Timestamp) -> MementoResult<Option<Memento>> {
        let storage_key = self.keys.encode(id, Some(at));
        let Some(blob) = self.blobs.get(&storage_key).await? else {
            return Ok(None);
        };
        tracing::debug!(key = %storage_key, "read memento blob");
        Ok(Some(Memento {
            key: VersionKey::new(id.clone(), at),
            storage_key,
            media_type: blob.media_type,
            metadata: MetadataBundle::from_map(blob.metadata),
            body: blob.data,
        }))
    }

    /// Every recorded timestamp of `id`, ascending.
    pub async fn timeline(&self, id: &ResourceId) -> MementoResult<Vec<Timestamp>> {
        Ok(self.index.timeline(id).await?)
    }

    /// The timemap of `id`: one range per version, each ending where the
    /// next begins. The last range ends now (or at the last version if that
    /// lies in the future).
    pub async fn list(&self, id: &ResourceId) -> MementoResult<Vec<VersionRange>> {
        let timeline = self.index.timeline(id).await?;
        Ok(ranges(&timeline, Timestamp::now()))
    }
}

fn ranges(timeline: &[Timestamp], now: Timestamp) -> Vec<VersionRange> {
    let mut out: Vec<VersionRange> = timeline
        .windows(2)
        .map(|pair| VersionRange::new(pair[0], pair[1]))
        .collect();
    if let Some(last) = timeline.last() {
        out.push(VersionRange::new(*last, now.max(*last)));
    }
    out
}
