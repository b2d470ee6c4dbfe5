//! In-memory BlobStore implementation

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::storage::traits::{BlobStore, StoredBlob};
use crate::storage::types::BlobRef;

/// In-memory blob store for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<BlobRef, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, data: &[u8]) -> Result<StoredBlob> {
        let blob_ref = BlobRef::from_data(data);
        let mut blobs = self.blobs.lock().unwrap();
        let is_new = blobs.insert(blob_ref.clone(), data.to_vec()).is_none();

        Ok(StoredBlob {
            blob_ref,
            size: data.len(),
            is_new,
        })
    }

    async fn get(&self, blob_ref: &BlobRef) -> Result<Vec<u8>> {
        let blobs = self.blobs.lock().unwrap();
        blobs
            .get(blob_ref)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Blob not found: {}", blob_ref))
    }

    async fn exists(&self, blob_ref: &BlobRef) -> bool {
        self.blobs.lock().unwrap().contains_key(blob_ref)
    }

    async fn delete(&self, blob_ref: &BlobRef) -> Result<bool> {
        Ok(self.blobs.lock().unwrap().remove(blob_ref).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_get() {
        let store = MemoryBlobStore::new();
        let data = b"hello world";

        let stored = store.store(data).await.unwrap();
        assert_eq!(stored.size, data.len());
        assert!(stored.is_new);

        let retrieved = store.get(&stored.blob_ref).await.unwrap();
        assert_eq!(retrieved, data);
    }

    #[tokio::test]
    async fn test_deduplication() {
        let store = MemoryBlobStore::new();
        let data = b"duplicate";

        let first = store.store(data).await.unwrap();
        assert!(first.is_new);

        let second = store.store(data).await.unwrap();
        assert!(!second.is_new);
        assert_eq!(first.blob_ref, second.blob_ref);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryBlobStore::new();
        let data = b"delete me";

        let stored = store.store(data).await.unwrap();
        assert!(store.exists(&stored.blob_ref).await);

        assert!(store.delete(&stored.blob_ref).await.unwrap());
        assert!(!store.exists(&stored.blob_ref).await);
        assert!(!store.delete(&stored.blob_ref).await.unwrap());
    }
}
