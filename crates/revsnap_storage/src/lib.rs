//! Immutable blob storage for raw report files.
//!
//! Every ingested attachment is stored before parsing so the original bytes
//! survive even when parsing fails. Paths are hash-addressed, which makes
//! writes naturally idempotent: storing the same bytes twice lands on the
//! same path and is reported as deduplicated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob not found: {0}")]
    NotFound(String),
}

/// Receipt for a stored blob.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Stable reference to hand to the snapshot registry.
    pub storage_ref: String,
    pub byte_size: usize,
    /// True when the bytes were already present under the same address.
    pub deduplicated: bool,
}

/// Write-once storage for raw report bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a content-hash address scoped to a hotel.
    async fn put(&self, hotel_id: i64, filename: &str, bytes: &[u8]) -> Result<StoredBlob>;

    /// Fetch previously stored bytes by their storage ref.
    async fn get(&self, storage_ref: &str) -> Result<Vec<u8>>;
}

/// Filesystem-backed blob store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative_path(hotel_id: i64, content_hash: &str, filename: &str) -> PathBuf {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        PathBuf::from(format!("hotel_{hotel_id}")).join(format!("{content_hash}.{ext}"))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    /// Atomic write: temp file with `create_new`, then rename onto the
    /// hash-addressed path. A concurrent writer of identical bytes loses the
    /// rename race harmlessly.
    async fn put(&self, hotel_id: i64, filename: &str, bytes: &[u8]) -> Result<StoredBlob> {
        let content_hash = revsnap_core::sha256_hex(bytes);
        let relative = Self::relative_path(hotel_id, &content_hash, filename);
        let absolute = self.root.join(&relative);
        let storage_ref = relative.to_string_lossy().to_string();

        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await?;
        }

        if fs::try_exists(&absolute).await? {
            debug!(storage_ref = %storage_ref, "blob already stored");
            return Ok(StoredBlob {
                storage_ref,
                byte_size: bytes.len(),
                deduplicated: true,
            });
        }

        let temp_path = absolute
            .parent()
            .unwrap_or_else(|| self.root.as_path())
            .join(format!(".{}.tmp", Uuid::new_v4()));

        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        match fs::rename(&temp_path, &absolute).await {
            Ok(()) => Ok(StoredBlob {
                storage_ref,
                byte_size: bytes.len(),
                deduplicated: false,
            }),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                let _ = fs::remove_file(&temp_path).await;
                Ok(StoredBlob {
                    storage_ref,
                    byte_size: bytes.len(),
                    deduplicated: true,
                })
            }
            Err(err) => {
                let _ = fs::remove_file(&temp_path).await;
                Err(err.into())
            }
        }
    }

    async fn get(&self, storage_ref: &str) -> Result<Vec<u8>> {
        let path = self.root.join(storage_ref);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_ref.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory blob store for tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, hotel_id: i64, filename: &str, bytes: &[u8]) -> Result<StoredBlob> {
        let content_hash = revsnap_core::sha256_hex(bytes);
        let storage_ref = FsBlobStore::relative_path(hotel_id, &content_hash, filename)
            .to_string_lossy()
            .to_string();

        let mut blobs = self.blobs.lock().await;
        let deduplicated = blobs.contains_key(&storage_ref);
        blobs.insert(storage_ref.clone(), bytes.to_vec());

        Ok(StoredBlob {
            storage_ref,
            byte_size: bytes.len(),
            deduplicated,
        })
    }

    async fn get(&self, storage_ref: &str) -> Result<Vec<u8>> {
        let blobs = self.blobs.lock().await;
        blobs
            .get(storage_ref)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_ref.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_put_then_get_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path());

        let stored = store.put(7, "forecast.tsv", b"a\tb\tc").await.unwrap();
        assert!(!stored.deduplicated);
        assert!(stored.storage_ref.starts_with("hotel_7/"));
        assert!(stored.storage_ref.ends_with(".tsv"));

        let bytes = store.get(&stored.storage_ref).await.unwrap();
        assert_eq!(bytes, b"a\tb\tc");
    }

    #[tokio::test]
    async fn test_fs_same_bytes_deduplicate() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path());

        let first = store.put(7, "forecast.tsv", b"same bytes").await.unwrap();
        let second = store.put(7, "renamed.tsv", b"same bytes").await.unwrap();

        assert!(!first.deduplicated);
        assert!(second.deduplicated);
        assert_eq!(first.storage_ref, second.storage_ref);
    }

    #[tokio::test]
    async fn test_fs_missing_blob_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path());

        let err = store.get("hotel_1/absent.tsv").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_extension_defaults_to_bin() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path());

        let stored = store.put(1, "attachment", b"x").await.unwrap();
        assert!(stored.storage_ref.ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_memory_store_matches_fs_contract() {
        let store = MemoryBlobStore::new();

        let first = store.put(7, "forecast.tsv", b"same bytes").await.unwrap();
        let second = store.put(7, "renamed.tsv", b"same bytes").await.unwrap();
        assert!(!first.deduplicated);
        assert!(second.deduplicated);

        let bytes = store.get(&first.storage_ref).await.unwrap();
        assert_eq!(bytes, b"same bytes");
        assert!(store.get("hotel_7/absent.tsv").await.is_err());
    }
}
