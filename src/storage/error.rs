//! Typed errors for content store operations
//!
//! Every kind is Clone so one fetch outcome can be broadcast to all waiters
//! of an in-flight proxy fetch.

use std::time::Duration;

/// Why an upstream fetch failed.
///
/// Produced by the upstream-content collaborator; surfaced to callers
/// unchanged. The store never retries on its own - retry policy belongs to
/// the caller or its scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("upstream unreachable: {0}")]
    Unreachable(String),
}

/// Errors returned by [`ContentStore`](crate::storage::ContentStore) operations.
///
/// `Fetch`/`FetchTimeout` mean the upstream could not deliver the content and
/// a later resolve may retry; `Storage` means local persistence failed and an
/// immediate local retry is reasonable without re-hitting the network.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContentError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("conflicting concurrent modification: {0}")]
    Conflict(String),

    #[error("invalid asset path: {0:?}")]
    InvalidPath(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("upstream fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("blob storage failure: {0}")]
    Storage(String),
}

impl ContentError {
    /// Whether a later resolve of the same path may succeed without any
    /// local intervention (the upstream was the problem, not this node)
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::FetchTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_are_upstream() {
        assert!(ContentError::Fetch(FetchError::Status(503)).is_upstream());
        assert!(ContentError::FetchTimeout(Duration::from_secs(5)).is_upstream());
        assert!(!ContentError::Storage("disk full".into()).is_upstream());
        assert!(!ContentError::NotFound("r/p".into()).is_upstream());
    }

    #[test]
    fn test_display() {
        let err = ContentError::Fetch(FetchError::Status(404));
        assert_eq!(err.to_string(), "upstream returned status 404");
    }
}
