//! Content storage: assets, components, blobs, and proxy fetch-and-cache
//!
//! The [`ContentStore`] is the single source of truth for the asset graph;
//! physical persistence and upstream access are delegated to the collaborator
//! traits in [`traits`], with implementations under [`implementations`].

pub mod content_store;
pub mod error;
pub mod ids;
pub mod implementations;
pub mod traits;
pub mod types;

pub use content_store::ContentStore;
pub use error::{ContentError, FetchError};
pub use ids::{AssetId, ComponentId, EntityId, RepositoryId};
pub use traits::{BlobStore, FetchedContent, StoredBlob, UpstreamSource};
pub use types::{
    normalize_path, Asset, AssetBlob, BlobRef, ChecksumSet, Component, ComponentCoords,
    Repository, RepositoryKind,
};
