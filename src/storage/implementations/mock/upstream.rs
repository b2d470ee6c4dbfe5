//! Mock upstream source for testing
//!
//! Responses are scripted per path and replaceable mid-test; an atomic
//! counter records how many upstream requests were actually issued, which is
//! what the at-most-one-fetch tests assert on.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::storage::error::FetchError;
use crate::storage::traits::{FetchedContent, UpstreamSource};
use crate::storage::types::Repository;

/// Scripted upstream with a fetch counter and optional artificial latency
#[derive(Default)]
pub struct MockUpstream {
    responses: Mutex<HashMap<String, Result<FetchedContent, FetchError>>>,
    delay: Mutex<Option<Duration>>,
    fetch_count: AtomicUsize,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response for a path (replaces any previous script)
    pub fn serve(&self, path: &str, bytes: Vec<u8>, content_type: &str) {
        self.responses.lock().unwrap().insert(
            path.to_string(),
            Ok(FetchedContent {
                bytes,
                content_type: content_type.to_string(),
                declared_checksums: None,
            }),
        );
    }

    /// Script a failure for a path (replaces any previous script)
    pub fn fail(&self, path: &str, error: FetchError) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(error));
    }

    /// Delay every fetch by the given duration (zero disables)
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = if delay.is_zero() { None } else { Some(delay) };
    }

    /// How many fetches were issued so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamSource for MockUpstream {
    async fn fetch(
        &self,
        _repository: &Repository,
        path: &str,
    ) -> Result<FetchedContent, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unscripted_path_is_404() {
        let upstream = MockUpstream::new();
        let repo = Repository::proxy("central");

        let err = upstream.fetch(&repo, "unknown").await.unwrap_err();
        assert_eq!(err, FetchError::Status(404));
        assert_eq!(upstream.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_script_replacement() {
        let upstream = MockUpstream::new();
        let repo = Repository::proxy("central");

        upstream.fail("a", FetchError::Status(500));
        assert!(upstream.fetch(&repo, "a").await.is_err());

        upstream.serve("a", b"ok".to_vec(), "text/plain");
        let content = upstream.fetch(&repo, "a").await.unwrap();
        assert_eq!(content.bytes, b"ok");
        assert_eq!(upstream.fetch_count(), 2);
    }
}
