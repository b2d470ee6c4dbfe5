//! Type-safe ID newtypes for stored entities
//!
//! All IDs are opaque string tokens wrapped in newtypes for compile-time
//! safety. Equality and hashing are by value; uniqueness is enforced by the
//! owning store, never by the identifier itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to define a type-safe ID newtype
macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Create from an existing token (detached/unsaved use, or loading
            /// from a persistence collaborator)
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

// Entities (addressable layer) - defined first since AssetId is an alias
define_id!(EntityId, "Unique identifier for a stored entity");

/// Type alias - assets are plain entities, no extra identity semantics
pub type AssetId = EntityId;

define_id!(ComponentId, "Unique identifier for a logical component");
define_id!(RepositoryId, "Unique identifier for a repository");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_from_string() {
        let id = ComponentId::from_string("test-id-123");
        assert_eq!(id.as_str(), "test-id-123");
    }

    #[test]
    fn test_id_display() {
        let id = RepositoryId::from_string("repo-abc");
        assert_eq!(format!("{}", id), "repo-abc");
    }

    #[test]
    fn test_id_serde() {
        let id = AssetId::from_string("asset-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"asset-123\"");

        let parsed: AssetId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
