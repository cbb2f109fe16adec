//! File-backed index service.
//!
//! One JSON record per resource key, named by the BLAKE3 hash of the key.
//! Read-modify-write cycles are serialized by a single async mutex, and each
//! rewrite is staged in a temporary file and moved into place.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::error::{IndexError, IndexResult};
use crate::memory::DEFAULT_PAGE_SIZE;
use crate::service::{page_of, IndexPage, IndexService};

#[derive(Serialize, Deserialize)]
struct Record {
    key: String,
    entries: BTreeSet<i64>,
}

/// Index service storing records under a local directory.
#[derive(Debug)]
pub struct FsIndexService {
    root: PathBuf,
    page_size: usize,
    write_lock: Mutex<()>,
}

impl FsIndexService {
    /// Open (creating if needed) a service rooted at `root`.
    pub async fn open(root: impl AsRef<Path>) -> IndexResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "opened filesystem index service");
        Ok(Self {
            root,
            page_size: DEFAULT_PAGE_SIZE,
            write_lock: Mutex::new(()),
        })
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.json", blake3::hash(key.as_bytes()).to_hex()))
    }

    async fn load(&self, key: &str) -> IndexResult<BTreeSet<i64>> {
        let bytes = match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };
        let record: Record = serde_json::from_slice(&bytes).map_err(|e| IndexError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        if record.key != key {
            return Err(IndexError::Corrupt {
                key: key.to_string(),
                reason: format!("record belongs to {:?}", record.key),
            });
        }
        Ok(record.entries)
    }

    async fn store(&self, key: &str, entries: BTreeSet<i64>) -> IndexResult<()> {
        let path = self.path_for(key);
        if entries.is_empty() {
            return match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }
        let record = Record {
            key: key.to_string(),
            entries,
        };
        let bytes = serde_json::to_vec(&record).map_err(|e| IndexError::Serialization(e.to_string()))?;
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut file = NamedTempFile::new_in(&root)?;
            file.write_all(&bytes)?;
            file.as_file().sync_all()?;
            file.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| IndexError::Io(std::io::Error::other(e)))??;
        Ok(())
    }
}

#[async_trait]
impl IndexService for FsIndexService {
    async fn get(&self, resource_key: &str, after: Option<i64>) -> IndexResult<IndexPage> {
        let set = self.load(resource_key).await?;
        Ok(page_of(&set, after, self.page_size))
    }

    async fn merge(&self, resource_key: &str, entries: &BTreeSet<i64>) -> IndexResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut set = self.load(resource_key).await?;
        let before = set.len();
        set.extend(entries.iter().copied());
        if set.len() == before {
            return Ok(());
        }
        self.store(resource_key, set).await
    }

    async fn remove(&self, resource_key: &str, entries: &BTreeSet<i64>) -> IndexResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut set = self.load(resource_key).await?;
        let before = set.len();
        set.retain(|e| !entries.contains(e));
        if set.len() == before {
            return Ok(());
        }
        self.store(resource_key, set).await
    }
}
