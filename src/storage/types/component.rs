//! Component types

use chrono::{DateTime, Utc};

use crate::storage::ids::{ComponentId, RepositoryId};

/// Logical coordinate of a component; format-specific and opaque to the core
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentCoords {
    /// Namespace / group (e.g., a Maven groupId); not every format has one
    pub namespace: Option<String>,

    /// Component name
    pub name: String,

    /// Version; not every format versions its components
    pub version: Option<String>,
}

impl ComponentCoords {
    /// Create coordinates with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            version: None,
        }
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A logical grouping of assets under one coordinate
///
/// Read-only snapshot; mutation goes through the content store.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: ComponentId,
    pub repository: RepositoryId,
    pub coords: ComponentCoords,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_builder() {
        let coords = ComponentCoords::named("createrepo")
            .with_namespace("tools")
            .with_version("1.2.3");
        assert_eq!(coords.name, "createrepo");
        assert_eq!(coords.namespace.as_deref(), Some("tools"));
        assert_eq!(coords.version.as_deref(), Some("1.2.3"));
    }
}
