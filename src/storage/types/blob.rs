//! Blob reference and content-metadata types

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque handle to physically stored bytes, resolved by the blob-store
/// collaborator. The content-addressed form is the hex SHA-256 of the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobRef(String);

impl BlobRef {
    /// Wrap an existing handle
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Compute the content-addressed handle for a byte slice
    pub fn from_data(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the inner handle string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BlobRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Digests of a blob's content; at least the strong SHA-256 is always present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumSet {
    pub sha256: String,
    pub sha1: Option<String>,
    pub md5: Option<String>,
}

impl ChecksumSet {
    /// Compute the checksum set for a byte slice (SHA-256 only)
    pub fn sha256_of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self {
            sha256: hex::encode(hasher.finalize()),
            sha1: None,
            md5: None,
        }
    }
}

/// Reference to physically stored bytes plus content metadata
///
/// Immutable once attached to an asset: a content change always produces a
/// new `AssetBlob` and a new attachment, never an in-place mutation.
#[derive(Debug, Clone)]
pub struct AssetBlob {
    /// Storage handle resolved by the blob-store collaborator
    pub blob_ref: BlobRef,

    /// Content length in bytes
    pub size: u64,

    /// Content digests
    pub checksums: ChecksumSet,

    /// Declared content type (e.g., "application/x-rpm")
    pub content_type: String,

    /// When the blob was created
    pub blob_created: DateTime<Utc>,
}

impl AssetBlob {
    /// Build blob metadata for freshly stored bytes
    pub fn for_bytes(blob_ref: BlobRef, data: &[u8], content_type: impl Into<String>) -> Self {
        Self {
            blob_ref,
            size: data.len() as u64,
            checksums: ChecksumSet::sha256_of(data),
            content_type: content_type.into(),
            blob_created: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_ref_from_data() {
        // Known SHA-256 hash of "test"
        let blob_ref = BlobRef::from_data(b"test");
        assert_eq!(
            blob_ref.as_str(),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_checksum_matches_blob_ref() {
        let data = b"some bytes";
        let checksums = ChecksumSet::sha256_of(data);
        assert_eq!(checksums.sha256, BlobRef::from_data(data).as_str());
        assert!(checksums.sha1.is_none());
    }

    #[test]
    fn test_for_bytes() {
        let data = b"rpm contents";
        let blob = AssetBlob::for_bytes(BlobRef::from_data(data), data, "application/x-rpm");
        assert_eq!(blob.size, data.len() as u64);
        assert_eq!(blob.content_type, "application/x-rpm");
        assert_eq!(blob.checksums.sha256, blob.blob_ref.as_str());
    }
}
