//! Storage types
//!
//! Shared types used by storage traits and implementations.

pub mod asset;
pub mod blob;
pub mod component;
pub mod repository;

// Re-exports for convenience
pub use asset::{normalize_path, Asset};
pub use blob::{AssetBlob, BlobRef, ChecksumSet};
pub use component::{Component, ComponentCoords};
pub use repository::{Repository, RepositoryKind};
