//! Collaborator implementations
//!
//! Blob storage backends and test doubles. The store itself only sees the
//! traits in [`crate::storage::traits`].

pub mod fs;
pub mod memory;
pub mod mock;

use async_trait::async_trait;

use crate::storage::error::FetchError;
use crate::storage::traits::{FetchedContent, UpstreamSource};
use crate::storage::types::Repository;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use mock::MockUpstream;

/// Upstream source for deployments with no proxy repositories.
///
/// Every fetch fails; hosted repositories never reach the upstream path, so
/// this only surfaces if a proxy repository is misconfigured against it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUpstream;

#[async_trait]
impl UpstreamSource for NoUpstream {
    async fn fetch(
        &self,
        repository: &Repository,
        path: &str,
    ) -> Result<FetchedContent, FetchError> {
        Err(FetchError::Unreachable(format!(
            "no upstream configured for {}/{}",
            repository.name, path
        )))
    }
}
