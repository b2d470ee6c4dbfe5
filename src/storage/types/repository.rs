//! Repository descriptor types

use crate::storage::ids::RepositoryId;

/// How a repository obtains its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    /// Content is uploaded directly into this repository
    Hosted,
    /// Content is mirrored from an upstream source, fetched on first access
    Proxy,
}

/// A repository that owns assets and components
///
/// The content store keys its asset graph by `(repository id, path)`; the
/// descriptor itself carries only what the core needs from the broader
/// repository configuration.
#[derive(Debug, Clone)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    pub kind: RepositoryKind,
}

impl Repository {
    /// Create a hosted repository descriptor
    pub fn hosted(name: impl Into<String>) -> Self {
        Self {
            id: RepositoryId::new(),
            name: name.into(),
            kind: RepositoryKind::Hosted,
        }
    }

    /// Create a proxy repository descriptor
    pub fn proxy(name: impl Into<String>) -> Self {
        Self {
            id: RepositoryId::new(),
            name: name.into(),
            kind: RepositoryKind::Proxy,
        }
    }

    /// Whether this repository fetches content on demand
    pub fn is_proxy(&self) -> bool {
        self.kind == RepositoryKind::Proxy
    }
}
