//! Filesystem blob store.
//!
//! Layout under the root directory:
//!
//! ```text
//! objects/<blake3(key)>.blob   envelope: header length, JSON header, payload
//! staging/                     temporary files, never read
//! ```
//!
//! Keys are hashed for file names so arbitrary key strings (slashes, `?`)
//! never reach the filesystem. Each blob is a single envelope file moved into
//! place with one rename, so a reader sees one writer's payload and metadata
//! together or nothing at all. Concurrent writers to one key: the last rename
//! wins.
//!
//! Envelope format:
//!
//! ```text
//! [8 bytes: header length, u64 BE][header JSON][payload]
//! ```
//!
//! The header carries the key, media type, metadata, payload size, and the
//! BLAKE3 digest of the payload.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::io::AsyncReadExt;

use crate::error::{StoreError, StoreResult};
use crate::memory::DEFAULT_PAGE_SIZE;
use crate::object::{KeyPage, StoredBlob};
use crate::traits::BlobStore;

const BLOB_EXT: &str = "blob";
const LEN_PREFIX: usize = 8;
/// Headers larger than this are treated as corruption.
const MAX_HEADER_LEN: u64 = 16 * 1024 * 1024;

#[derive(Serialize, Deserialize)]
struct Header {
    key: String,
    media_type: String,
    metadata: BTreeMap<String, String>,
    size: u64,
    digest: String,
}

/// Blob store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    objects: PathBuf,
    staging: PathBuf,
    page_size: usize,
}

impl FsBlobStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref();
        let objects = root.join("objects");
        let staging = root.join("staging");
        tokio::fs::create_dir_all(&objects).await?;
        tokio::fs::create_dir_all(&staging).await?;
        tracing::debug!(root = %root.display(), "opened filesystem blob store");
        Ok(Self {
            objects,
            staging,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name = blake3::hash(key.as_bytes()).to_hex();
        self.objects.join(format!("{name}.{BLOB_EXT}"))
    }

    /// Read only the header of the envelope at `path`.
    async fn read_header(path: &Path) -> StoreResult<Option<Header>> {
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let corrupt = |reason: String| StoreError::Corrupt {
            key: path.display().to_string(),
            reason,
        };
        let len = file
            .read_u64()
            .await
            .map_err(|e| corrupt(format!("header length: {e}")))?;
        if len > MAX_HEADER_LEN {
            return Err(corrupt(format!("header length {len} exceeds limit")));
        }
        let mut header = vec![0u8; len as usize];
        file.read_exact(&mut header)
            .await
            .map_err(|e| corrupt(format!("header: {e}")))?;
        serde_json::from_slice(&header)
            .map(Some)
            .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))
    }
}

fn encode_envelope(key: &str, blob: StoredBlob) -> StoreResult<Vec<u8>> {
    let header = Header {
        key: key.to_string(),
        media_type: blob.media_type,
        metadata: blob.metadata,
        size: blob.data.len() as u64,
        digest: blake3::hash(&blob.data).to_hex().to_string(),
    };
    let header = serde_json::to_vec(&header).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut out = Vec::with_capacity(LEN_PREFIX + header.len() + blob.data.len());
    out.extend_from_slice(&(header.len() as u64).to_be_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(&blob.data);
    Ok(out)
}

fn decode_envelope(key: &str, mut bytes: Vec<u8>) -> StoreResult<StoredBlob> {
    let corrupt = |reason: String| StoreError::Corrupt {
        key: key.to_string(),
        reason,
    };
    let Some((prefix, rest)) = bytes.split_first_chunk::<LEN_PREFIX>() else {
        return Err(corrupt("envelope shorter than its length prefix".into()));
    };
    let len = u64::from_be_bytes(*prefix);
    if len > rest.len() as u64 {
        return Err(corrupt(format!("header length {len} exceeds envelope")));
    }
    let header_end = LEN_PREFIX + len as usize;
    let header: Header = serde_json::from_slice(&bytes[LEN_PREFIX..header_end])
        .map_err(|e| StoreError::Serialization(format!("{key}: {e}")))?;
    if header.key != key {
        return Err(corrupt(format!("envelope belongs to {:?}", header.key)));
    }
    let data = bytes.split_off(header_end);
    if data.len() as u64 != header.size {
        return Err(corrupt(format!("expected {} bytes, found {}", header.size, data.len())));
    }
    if blake3::hash(&data).to_hex().as_str() != header.digest {
        return Err(corrupt("payload digest mismatch".into()));
    }
    Ok(StoredBlob::new(data, header.media_type, header.metadata))
}

/// Write `bytes` to a staging file and atomically move it to `target`.
///
/// The staging file is deleted if anything fails before the move.
fn write_staged(staging: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = NamedTempFile::new_in(staging)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, blob: StoredBlob) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let envelope = encode_envelope(key, blob)?;
        let staging = self.staging.clone();
        let target = self.path_for(key);
        tokio::task::spawn_blocking(move || write_staged(&staging, &target, &envelope))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;

        tracing::trace!(key, "stored blob");
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredBlob>> {
        let bytes = match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode_envelope(key, bytes).map(Some)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(tokio::fs::try_exists(self.path_for(key)).await?)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_keys(&self, prefix: &str, continuation: Option<&str>) -> StoreResult<KeyPage> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.objects).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(BLOB_EXT) {
                continue;
            }
            // An envelope deleted mid-scan is simply skipped.
            if let Some(header) = Self::read_header(&path).await? {
                let after = continuation.map_or(true, |c| header.key.as_str() > c);
                if header.key.starts_with(prefix) && after {
                    keys.push(header.key);
                }
            }
        }
        keys.sort();

        let continuation = if keys.len() > self.page_size {
            keys.truncate(self.page_size);
            keys.last().cloned()
        } else {
            None
        };
        Ok(KeyPage { keys, continuation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn blob(content: &[u8]) -> StoredBlob {
        let mut metadata = BTreeMap::new();
        metadata.insert("has-acl".to_string(), "true".to_string());
        StoredBlob::new(content.to_vec(), "application/json", metadata)
    }

    fn staging_is_empty(dir: &TempDir) -> bool {
        std::fs::read_dir(dir.path().join("staging")).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn put_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        store.put("a/b?version=1", blob(b"payload")).await.unwrap();

        let read = store.get("a/b?version=1").await.unwrap().unwrap();
        assert_eq!(read, blob(b"payload"));
        assert!(store.exists("a/b?version=1").await.unwrap());
    }

    #[tokio::test]
    async fn empty_payload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        store.put("k", blob(b"")).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap(), blob(b""));
    }

    #[tokio::test]
    async fn missing_key() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        assert!(store.get("nope").await.unwrap().is_none());
        assert!(!store.exists("nope").await.unwrap());
        assert!(!store.delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_envelope() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        store.put("k", blob(b"x")).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(store.get("k").await.unwrap().is_none());
        let mut entries = std::fs::read_dir(dir.path().join("objects")).unwrap();
        assert!(entries.next().is_none());
    }

    #[tokio::test]
    async fn staging_left_empty() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        store.put("k", blob(b"x")).await.unwrap();
        assert!(staging_is_empty(&dir));
    }

    #[tokio::test]
    async fn failed_move_releases_staging_file() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        // A directory in the envelope's place makes the final rename fail.
        let target = store.path_for("k");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("occupant"), b"x").unwrap();

        assert!(matches!(store.put("k", blob(b"payload")).await, Err(StoreError::Io(_))));
        assert!(staging_is_empty(&dir));
    }

    #[tokio::test]
    async fn truncated_payload_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        store.put("k", blob(b"12345")).await.unwrap();
        let path = store.path_for("k");
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 3);
        std::fs::write(&path, bytes).unwrap();
        assert!(matches!(store.get("k").await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn altered_payload_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        store.put("k", blob(b"12345")).await.unwrap();
        let path = store.path_for("k");
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = b'9';
        std::fs::write(&path, bytes).unwrap();
        assert!(matches!(store.get("k").await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn garbage_envelope_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        std::fs::write(store.path_for("k"), b"abc").unwrap();
        assert!(matches!(store.get("k").await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn concurrent_writers_never_mix_payload_and_metadata() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        for round in 0..50 {
            let key = format!("r?version={round}");
            let mut handles = Vec::new();
            for writer in 0u8..4 {
                let store = store.clone();
                let key = key.clone();
                handles.push(tokio::spawn(async move {
                    let mut metadata = BTreeMap::new();
                    metadata.insert("writer".to_string(), writer.to_string());
                    store
                        .put(&key, StoredBlob::new(vec![writer; 64], "application/octet-stream", metadata))
                        .await
                }));
            }
            for h in handles {
                h.await.unwrap().unwrap();
            }

            let read = store.get(&key).await.unwrap().unwrap();
            let writer: u8 = read.metadata["writer"].parse().unwrap();
            assert!(read.data.iter().all(|b| *b == writer), "round {round} mixed two writers");
        }
        assert!(staging_is_empty(&dir));
    }

    #[tokio::test]
    async fn listing_sorted_and_paginated() {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap().with_page_size(2);
        for key in ["r?version=3", "r?version=1", "other?version=1", "r?version=2"] {
            store.put(key, blob(b"x")).await.unwrap();
        }
        let first = store.list_keys("r?version=", None).await.unwrap();
        assert_eq!(first.keys, vec!["r?version=1", "r?version=2"]);
        let all = store.list_all_keys("r?version=").await.unwrap();
        assert_eq!(all, vec!["r?version=1", "r?version=2", "r?version=3"]);
    }

    #[tokio::test]
    async fn reopen_sees_existing_blobs() {
        let dir = TempDir::new().unwrap();
        {
            let store = FsBlobStore::open(dir.path()).await.unwrap();
            store.put("k", blob(b"x")).await.unwrap();
        }
        let store = FsBlobStore::open(dir.path()).await.unwrap();
        assert!(store.exists("k").await.unwrap());
    }
}
