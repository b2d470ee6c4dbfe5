//! Content-storage core for the Depot artifact repository manager
//!
//! This crate provides:
//! - **Domain model**: `Asset`, `Component`, `AssetBlob` with type-safe ids
//! - **Content store**: single source of truth for the asset graph, with
//!   atomic blob attachment and proxy fetch-and-cache
//! - **Collaborator traits**: `BlobStore` and `UpstreamSource`, with
//!   filesystem, in-memory, and mock implementations
//! - **Execution gateway**: `CommandLineExecutor` for running allow-listed
//!   external tools over repository content
//!
//! # Example
//!
//! ```ignore
//! use depot_core::storage::{ContentStore, Repository};
//!
//! let store = ContentStore::new(blob_store, upstream);
//! let repo = Repository::proxy("central");
//! store.create_asset(&repo, "pkg/tool.rpm", "ARCHIVE", None)?;
//! let asset = store.resolve_asset(&repo, "pkg/tool.rpm").await?;
//! ```

pub mod exec;
pub mod storage;

pub use exec::{CommandLineExecutor, ExecConfig, ExecError};
pub use storage::{
    Asset, AssetBlob, AssetId, BlobRef, BlobStore, ChecksumSet, Component, ComponentCoords,
    ComponentId, ContentError, ContentStore, EntityId, FetchError, FetchedContent, Repository,
    RepositoryId, RepositoryKind, StoredBlob, UpstreamSource,
};
