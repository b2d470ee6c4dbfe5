//! Asset types and path normalization

use chrono::{DateTime, Utc};

use crate::storage::error::ContentError;
use crate::storage::ids::{AssetId, ComponentId, RepositoryId};
use crate::storage::types::blob::AssetBlob;

/// A uniquely-pathed piece of content within a repository
///
/// Read-only snapshot of store state; the content store is the only writer.
/// A blob-less asset is a valid state: a proxy repository may have recorded
/// the path without having fetched the content yet.
#[derive(Debug, Clone)]
pub struct Asset {
    pub id: AssetId,

    /// Owning repository
    pub repository: RepositoryId,

    /// Repository-relative, normalized path; unique per repository
    pub path: String,

    /// Format-defined tag (e.g., "ARCHIVE", "METADATA")
    pub kind: String,

    /// Logical coordinate this asset is grouped under, if any
    pub component: Option<ComponentId>,

    /// Currently attached blob, if the content has been stored or fetched
    pub blob: Option<AssetBlob>,

    /// If/when this asset was last downloaded by a client
    pub last_downloaded: Option<DateTime<Utc>>,
}

impl Asset {
    /// Whether content is attached
    pub fn has_blob(&self) -> bool {
        self.blob.is_some()
    }
}

/// Normalize a repository-relative path.
///
/// Rejects empty paths and any `..` segment; strips a leading `/` and
/// collapses empty and `.` segments so `(repository, path)` keys compare
/// consistently.
pub fn normalize_path(raw: &str) -> Result<String, ContentError> {
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(ContentError::InvalidPath(raw.to_string())),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(ContentError::InvalidPath(raw.to_string()));
    }

    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_slash() {
        assert_eq!(normalize_path("/repodata/repomd.xml").unwrap(), "repodata/repomd.xml");
    }

    #[test]
    fn test_normalize_collapses_segments() {
        assert_eq!(normalize_path("a//b/./c").unwrap(), "a/b/c");
    }

    #[test]
    fn test_normalize_rejects_parent_segments() {
        assert!(matches!(
            normalize_path("a/../etc/passwd"),
            Err(ContentError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(matches!(normalize_path(""), Err(ContentError::InvalidPath(_))));
        assert!(matches!(normalize_path("//"), Err(ContentError::InvalidPath(_))));
    }
}
