//! Content-Addressable Storage (CAS) for blobs
//!
//! Files are stored by their SHA-256 hash, enabling:
//! - Deduplication (same content stored once)
//! - Integrity verification (hash validates content)
//! - Stable handles for asset attachment

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::storage::traits::{BlobStore, StoredBlob};
use crate::storage::types::BlobRef;

/// Content-addressable blob storage on filesystem
///
/// Files are stored in a sharded directory structure based on the first 2
/// characters of their SHA-256 hash: `root/{hash[0:2]}/{hash}`
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a new FsBlobStore with the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the filesystem path for a blob
    pub fn path_for(&self, blob_ref: &BlobRef) -> PathBuf {
        let hash = blob_ref.as_str();
        if hash.len() < 2 {
            return self.root.join(hash);
        }
        let shard = &hash[0..2];
        self.root.join(shard).join(hash)
    }

    /// Get the size of a blob without reading its contents
    pub async fn size(&self, blob_ref: &BlobRef) -> anyhow::Result<u64> {
        let path = self.path_for(blob_ref);
        let metadata = fs::metadata(&path).await?;
        Ok(metadata.len())
    }

    /// Verify that a blob's content matches its handle
    pub async fn verify(&self, blob_ref: &BlobRef) -> anyhow::Result<bool> {
        let data = self.get(blob_ref).await?;
        let computed = BlobRef::from_data(&data);
        Ok(computed == *blob_ref)
    }

    /// Clean up orphaned temp files
    pub async fn cleanup_temp_files(&self) -> anyhow::Result<usize> {
        let mut cleaned = 0;

        if !fs::try_exists(&self.root).await? {
            return Ok(0);
        }

        let mut shard_entries = fs::read_dir(&self.root).await?;
        while let Some(shard_entry) = shard_entries.next_entry().await? {
            let shard_path = shard_entry.path();

            if !shard_path.is_dir() {
                continue;
            }

            let mut blob_entries = fs::read_dir(&shard_path).await?;
            while let Some(blob_entry) = blob_entries.next_entry().await? {
                let blob_path = blob_entry.path();

                if let Some(ext) = blob_path.extension() {
                    if ext == "tmp" {
                        fs::remove_file(&blob_path).await?;
                        cleaned += 1;
                    }
                }
            }
        }

        Ok(cleaned)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(&self, data: &[u8]) -> anyhow::Result<StoredBlob> {
        let blob_ref = BlobRef::from_data(data);
        let path = self.path_for(&blob_ref);

        // Check if already exists (deduplication)
        if fs::try_exists(&path).await? {
            return Ok(StoredBlob {
                blob_ref,
                size: data.len(),
                is_new: false,
            });
        }

        // Create shard directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write atomically using a temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &path).await?;

        Ok(StoredBlob {
            blob_ref,
            size: data.len(),
            is_new: true,
        })
    }

    async fn get(&self, blob_ref: &BlobRef) -> anyhow::Result<Vec<u8>> {
        let path = self.path_for(blob_ref);
        let data = fs::read(&path).await?;
        Ok(data)
    }

    async fn exists(&self, blob_ref: &BlobRef) -> bool {
        self.path_for(blob_ref).exists()
    }

    async fn delete(&self, blob_ref: &BlobRef) -> anyhow::Result<bool> {
        let path = self.path_for(blob_ref);
        if path.exists() {
            fs::remove_file(&path).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
