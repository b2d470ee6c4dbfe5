//! Collaborator traits for content storage
//!
//! These traits define the interfaces the content store consumes: physical
//! blob persistence and on-demand upstream content. Implementations live in
//! `implementations/`.

use async_trait::async_trait;

use crate::storage::error::FetchError;
use crate::storage::types::{BlobRef, ChecksumSet, Repository};

/// Result of storing a blob
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Content-addressed storage handle
    pub blob_ref: BlobRef,
    /// Size in bytes
    pub size: usize,
    /// Whether this was a new blob (false if already existed)
    pub is_new: bool,
}

/// Content-addressable blob storage trait
///
/// Physical persistence is entirely delegated here; the content store only
/// ever holds handles.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store binary data and return its content-addressed handle
    async fn store(&self, data: &[u8]) -> anyhow::Result<StoredBlob>;

    /// Retrieve blob data by handle
    async fn get(&self, blob_ref: &BlobRef) -> anyhow::Result<Vec<u8>>;

    /// Check if a blob exists
    async fn exists(&self, blob_ref: &BlobRef) -> bool;

    /// Delete a blob by handle
    ///
    /// Returns Ok(true) if deleted, Ok(false) if didn't exist
    async fn delete(&self, blob_ref: &BlobRef) -> anyhow::Result<bool>;
}

/// Content delivered by an upstream source
#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// Checksums the upstream declared for the content, if any
    pub declared_checksums: Option<ChecksumSet>,
}

/// Upstream-content collaborator for proxy repositories
///
/// The content store is the sole caller; it treats the upstream as slow and
/// failing, and never holds internal locks across a fetch.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Fetch the content at `path` from the repository's upstream
    async fn fetch(&self, repository: &Repository, path: &str)
        -> Result<FetchedContent, FetchError>;
}
