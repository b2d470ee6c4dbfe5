//! Content store - single source of truth for asset/component/blob state
//!
//! The store owns the mapping from `(repository, path)` to asset, enforces
//! uniqueness and attachment invariants, and coordinates proxy
//! fetch-and-cache. Callers get read-only snapshots; every mutation goes
//! through a store operation.
//!
//! Concurrency: there is no global lock. Graph mutations serialize on a
//! short-lived mutex, and upstream fetches serialize per `(repository, path)`
//! through an in-flight map of `watch` channels - at most one fetch runs for
//! a given path, and every concurrent resolver observes the same outcome.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use crate::storage::error::{ContentError, FetchError};
use crate::storage::ids::{AssetId, ComponentId, RepositoryId};
use crate::storage::traits::{BlobStore, UpstreamSource};
use crate::storage::types::{
    normalize_path, Asset, AssetBlob, BlobRef, Component, ComponentCoords, Repository,
};

/// Key of the asset graph: one asset per (repository, normalized path)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ContentKey {
    repository: RepositoryId,
    path: String,
}

impl ContentKey {
    fn new(repository: &RepositoryId, path: String) -> Self {
        Self {
            repository: repository.clone(),
            path,
        }
    }

    fn display(&self) -> String {
        format!("{}/{}", self.repository, self.path)
    }
}

/// Broadcast slot for an in-flight fetch: `None` until the outcome is known
type FetchSlot = Option<Result<Asset, ContentError>>;

/// Removes the in-flight marker when the winning fetch finishes - or is
/// cancelled. A stuck marker would block every later resolve of the path.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashMap<ContentKey, watch::Receiver<FetchSlot>>>,
    key: ContentKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().unwrap().remove(&self.key);
    }
}

/// Single source of truth for asset/component/blob state.
///
/// Generic over the blob-store and upstream-content collaborators, both
/// treated as slow and potentially failing: no internal lock is held across
/// a collaborator call.
pub struct ContentStore<B: BlobStore, U: UpstreamSource> {
    blob_store: Arc<B>,
    upstream: Arc<U>,
    assets: Mutex<HashMap<ContentKey, Asset>>,
    components: Mutex<HashMap<ComponentId, Component>>,
    /// Blob handles whose assets were deleted or re-attached; eligible for
    /// garbage collection by an external collaborator
    detached: Mutex<Vec<BlobRef>>,
    in_flight: Mutex<HashMap<ContentKey, watch::Receiver<FetchSlot>>>,
    fetch_timeout: Option<Duration>,
}

impl<B: BlobStore, U: UpstreamSource> ContentStore<B, U> {
    /// Create a store over the given collaborators
    pub fn new(blob_store: Arc<B>, upstream: Arc<U>) -> Self {
        Self {
            blob_store,
            upstream,
            assets: Mutex::new(HashMap::new()),
            components: Mutex::new(HashMap::new()),
            detached: Mutex::new(Vec::new()),
            in_flight: Mutex::new(HashMap::new()),
            fetch_timeout: None,
        }
    }

    /// Set a default upstream-fetch timeout applied by `resolve_asset`
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    // ========== Asset operations ==========

    /// Record a newly observed path (local upload, or proxy pre-registration).
    ///
    /// The asset starts blob-less; content is attached separately. Fails with
    /// `Conflict` if the path already exists in the repository and `NotFound`
    /// if a component link names an unknown component.
    pub fn create_asset(
        &self,
        repository: &Repository,
        path: &str,
        kind: impl Into<String>,
        component: Option<ComponentId>,
    ) -> Result<Asset, ContentError> {
        let path = normalize_path(path)?;
        let key = ContentKey::new(&repository.id, path.clone());

        // Held across the insert so a concurrent delete_component cannot slip
        // between the existence check and the link (lock order: components,
        // then assets).
        let components = self.components.lock().unwrap();
        if let Some(component_id) = &component {
            if !components.contains_key(component_id) {
                return Err(ContentError::NotFound(format!(
                    "component {component_id}"
                )));
            }
        }

        let mut assets = self.assets.lock().unwrap();
        if assets.contains_key(&key) {
            return Err(ContentError::Conflict(format!(
                "asset already exists: {}",
                key.display()
            )));
        }

        let asset = Asset {
            id: AssetId::new(),
            repository: repository.id.clone(),
            path,
            kind: kind.into(),
            component,
            blob: None,
            last_downloaded: None,
        };
        assets.insert(key, asset.clone());
        Ok(asset)
    }

    /// Look up an asset without triggering a proxy fetch
    pub fn get_asset(&self, repository: &RepositoryId, path: &str) -> Option<Asset> {
        let path = normalize_path(path).ok()?;
        let key = ContentKey::new(repository, path);
        self.assets.lock().unwrap().get(&key).cloned()
    }

    /// Resolve an asset by path.
    ///
    /// Returns the snapshot immediately when the blob is attached (or when the
    /// repository is hosted - blob-less is a valid state there). A blob-less
    /// asset in a proxy repository triggers fetch-and-cache first; concurrent
    /// resolvers of the same path wait on the in-flight fetch rather than
    /// issuing duplicate upstream requests.
    pub async fn resolve_asset(
        &self,
        repository: &Repository,
        path: &str,
    ) -> Result<Asset, ContentError> {
        self.resolve_asset_with_timeout(repository, path, self.fetch_timeout)
            .await
    }

    /// [`resolve_asset`](Self::resolve_asset) with a caller-supplied upstream
    /// timeout overriding the store default
    pub async fn resolve_asset_with_timeout(
        &self,
        repository: &Repository,
        path: &str,
        timeout: Option<Duration>,
    ) -> Result<Asset, ContentError> {
        let path = normalize_path(path)?;
        let key = ContentKey::new(&repository.id, path);

        let asset = {
            let assets = self.assets.lock().unwrap();
            assets
                .get(&key)
                .cloned()
                .ok_or_else(|| ContentError::NotFound(key.display()))?
        };

        if asset.has_blob() || !repository.is_proxy() {
            return Ok(asset);
        }

        self.fetch_and_cache(repository, key, timeout).await
    }

    /// Atomically attach (or swap) the asset's blob.
    ///
    /// The previous blob, if any, becomes eligible for collection only after
    /// this call returns. Fails with `Conflict` if the asset was concurrently
    /// deleted.
    pub fn attach_blob(&self, asset: &Asset, blob: AssetBlob) -> Result<Asset, ContentError> {
        let key = ContentKey::new(&asset.repository, asset.path.clone());
        self.attach_by_key(&key, blob)
    }

    /// Record that a client actually retrieved the content.
    ///
    /// Best-effort statistic; concurrent calls may race but the timestamp
    /// never moves backward (last-writer-by-time wins).
    pub fn record_download(&self, asset: &Asset) -> Result<Asset, ContentError> {
        let key = ContentKey::new(&asset.repository, asset.path.clone());
        let mut assets = self.assets.lock().unwrap();
        let record = assets
            .get_mut(&key)
            .ok_or_else(|| ContentError::NotFound(key.display()))?;

        let now = Utc::now();
        if record.last_downloaded.map_or(true, |prev| prev < now) {
            record.last_downloaded = Some(now);
        }
        Ok(record.clone())
    }

    /// Remove an asset and mark its current blob detached.
    ///
    /// Fails with `NotFound` if absent - deleting an already-deleted path is
    /// an error result, never a crash or a silent success.
    pub fn delete_asset(&self, repository: &RepositoryId, path: &str) -> Result<(), ContentError> {
        let path = normalize_path(path)?;
        let key = ContentKey::new(repository, path);

        let removed = self
            .assets
            .lock()
            .unwrap()
            .remove(&key)
            .ok_or_else(|| ContentError::NotFound(key.display()))?;

        if let Some(blob) = removed.blob {
            self.detached.lock().unwrap().push(blob.blob_ref);
        }
        Ok(())
    }

    /// List all assets of a repository
    pub fn list_assets(&self, repository: &RepositoryId) -> Vec<Asset> {
        self.assets
            .lock()
            .unwrap()
            .values()
            .filter(|asset| &asset.repository == repository)
            .cloned()
            .collect()
    }

    /// Remove every asset and component of a repository.
    ///
    /// Returns the number of assets removed; their blobs are marked detached.
    pub fn purge_repository(&self, repository: &RepositoryId) -> usize {
        let removed: Vec<Asset> = {
            let mut assets = self.assets.lock().unwrap();
            let keys: Vec<ContentKey> = assets
                .keys()
                .filter(|key| &key.repository == repository)
                .cloned()
                .collect();
            keys.iter().filter_map(|key| assets.remove(key)).collect()
        };

        {
            let mut detached = self.detached.lock().unwrap();
            for asset in &removed {
                if let Some(blob) = &asset.blob {
                    detached.push(blob.blob_ref.clone());
                }
            }
        }

        self.components
            .lock()
            .unwrap()
            .retain(|_, component| &component.repository != repository);

        removed.len()
    }

    /// Drain the blob handles detached since the last call.
    ///
    /// Hand-off point for a garbage-collection collaborator; handles appear
    /// here only after the detaching operation has returned.
    pub fn take_detached_blobs(&self) -> Vec<BlobRef> {
        std::mem::take(&mut *self.detached.lock().unwrap())
    }

    // ========== Component operations ==========

    /// Record a logical component coordinate
    pub fn create_component(
        &self,
        repository: &Repository,
        coords: ComponentCoords,
    ) -> Component {
        let component = Component {
            id: ComponentId::new(),
            repository: repository.id.clone(),
            coords,
            created_at: Utc::now(),
        };
        self.components
            .lock()
            .unwrap()
            .insert(component.id.clone(), component.clone());
        component
    }

    /// Look up a component by id
    pub fn get_component(&self, id: &ComponentId) -> Option<Component> {
        self.components.lock().unwrap().get(id).cloned()
    }

    /// Remove a component and clear the link on any referencing asset.
    ///
    /// Whether referencing assets should be deleted as well is a caller
    /// (format plugin) decision; the core only keeps the graph consistent.
    pub fn delete_component(&self, id: &ComponentId) -> Result<(), ContentError> {
        self.components
            .lock()
            .unwrap()
            .remove(id)
            .ok_or_else(|| ContentError::NotFound(format!("component {id}")))?;

        let mut assets = self.assets.lock().unwrap();
        for asset in assets.values_mut() {
            if asset.component.as_ref() == Some(id) {
                asset.component = None;
            }
        }
        Ok(())
    }

    // ========== Proxy fetch-and-cache ==========

    /// Run (or join) the at-most-one upstream fetch for `key`
    async fn fetch_and_cache(
        &self,
        repository: &Repository,
        key: ContentKey,
        timeout: Option<Duration>,
    ) -> Result<Asset, ContentError> {
        enum Role {
            Winner(watch::Sender<FetchSlot>),
            Waiter(watch::Receiver<FetchSlot>),
        }

        // The map lock is held only to register/subscribe, never across the
        // fetch itself.
        let role = {
            let mut in_flight = self.in_flight.lock().unwrap();
            match in_flight.get(&key) {
                Some(rx) => Role::Waiter(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    in_flight.insert(key.clone(), rx);
                    Role::Winner(tx)
                }
            }
        };

        match role {
            Role::Waiter(mut rx) => loop {
                if let Some(outcome) = rx.borrow_and_update().clone() {
                    return outcome;
                }
                if rx.changed().await.is_err() {
                    // Winner vanished without publishing (cancelled mid-fetch).
                    // The marker is gone, so a later resolve can retry.
                    return Err(ContentError::Fetch(FetchError::Unreachable(
                        format!("in-flight fetch aborted: {}", key.display()),
                    )));
                }
            },
            Role::Winner(tx) => {
                let _guard = InFlightGuard {
                    in_flight: &self.in_flight,
                    key: key.clone(),
                };
                let outcome = self.do_fetch(repository, &key, timeout).await;
                let _ = tx.send(Some(outcome.clone()));
                outcome
            }
        }
    }

    /// Fetch from upstream, persist the blob, attach it
    async fn do_fetch(
        &self,
        repository: &Repository,
        key: &ContentKey,
        timeout: Option<Duration>,
    ) -> Result<Asset, ContentError> {
        // A previous fetch may have completed between our blob-less
        // observation and in-flight registration.
        {
            let assets = self.assets.lock().unwrap();
            match assets.get(key) {
                Some(asset) if asset.has_blob() => return Ok(asset.clone()),
                Some(_) => {}
                None => return Err(ContentError::NotFound(key.display())),
            }
        }

        tracing::debug!("proxy fetch: {}", key.display());
        let fetched = match timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.upstream.fetch(repository, &key.path)).await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        tracing::warn!(
                            "proxy fetch timed out after {:?}: {}",
                            limit,
                            key.display()
                        );
                        return Err(ContentError::FetchTimeout(limit));
                    }
                }
            }
            None => self.upstream.fetch(repository, &key.path).await?,
        };

        let stored = self
            .blob_store
            .store(&fetched.bytes)
            .await
            .map_err(|e| ContentError::Storage(e.to_string()))?;
        let blob_is_new = stored.is_new;

        let mut blob = AssetBlob::for_bytes(stored.blob_ref, &fetched.bytes, fetched.content_type);
        if let Some(declared) = fetched.declared_checksums {
            // Keep the locally computed sha256; adopt any extra declared digests
            blob.checksums.sha1 = declared.sha1;
            blob.checksums.md5 = declared.md5;
        }

        match self.attach_by_key(key, blob.clone()) {
            Ok(asset) => {
                tracing::debug!("proxy fetch cached: {} ({} bytes)", key.display(), blob.size);
                Ok(asset)
            }
            Err(err) => {
                // The asset was deleted while we fetched; don't leave the
                // freshly stored bytes orphaned. Only this fetch's own blob
                // may be dropped - a deduplicating blob store can hand back
                // a handle another asset still owns.
                if blob_is_new {
                    let _ = self.blob_store.delete(&blob.blob_ref).await;
                }
                Err(err)
            }
        }
    }

    fn attach_by_key(&self, key: &ContentKey, blob: AssetBlob) -> Result<Asset, ContentError> {
        let mut assets = self.assets.lock().unwrap();
        let record = assets.get_mut(key).ok_or_else(|| {
            ContentError::Conflict(format!("asset concurrently deleted: {}", key.display()))
        })?;

        let previous = record.blob.replace(blob);
        let snapshot = record.clone();
        drop(assets);

        if let Some(previous) = previous {
            self.detached.lock().unwrap().push(previous.blob_ref);
        }
        Ok(snapshot)
    }
}
