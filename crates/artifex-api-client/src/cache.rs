//! Read-through cache of artifact listings.
//!
//! Listings are keyed by `(session, viewer)` and served without a network
//! call while younger than the staleness window. Entries can only be filled
//! by `get_or_fetch` and dropped by `invalidate`; callers never write them.
//!
//! Each key carries a generation bumped by `invalidate`. A fetch that was in
//! flight across an invalidation still returns its result to its caller but
//! does not store it, so the next read goes back to the server.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use artifex_core::error::Result;
use artifex_core::models::ArtifactMetadata;
use artifex_core::SessionContext;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub session_id: String,
    pub viewer: String,
}

impl CacheKey {
    pub fn new(session_id: impl Into<String>, viewer: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            viewer: viewer.into(),
        }
    }

    pub fn for_context(ctx: &SessionContext) -> Self {
        Self::new(&ctx.session_id, &ctx.user_id)
    }
}

#[derive(Clone)]
struct CachedListing {
    artifacts: Vec<ArtifactMetadata>,
    fetched_at: Instant,
}

#[derive(Default)]
struct Slot {
    listing: Option<CachedListing>,
    generation: u64,
}

type ListingStore = Arc<RwLock<HashMap<CacheKey, Slot>>>;

/// Shared artifact listing cache. Clones share the same store.
#[derive(Clone)]
pub struct ArtifactCache {
    store: ListingStore,
    stale_after: Duration,
}

impl ArtifactCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            stale_after,
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Serve a fresh cached listing, or run `fetch` and cache its result.
    ///
    /// Fetch errors are returned as-is and leave the cache untouched.
    pub async fn get_or_fetch<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<Vec<ArtifactMetadata>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ArtifactMetadata>>>,
    {
        let generation = {
            let store = self.store.read().await;
            match store.get(key) {
                Some(slot) => {
                    if let Some(listing) = &slot.listing {
                        if listing.fetched_at.elapsed() < self.stale_after {
                            debug!(session_id = %key.session_id, "Artifact listing served from cache");
                            return Ok(listing.artifacts.clone());
                        }
                    }
                    slot.generation
                }
                None => 0,
            }
        };

        debug!(session_id = %key.session_id, "Artifact listing cache miss, fetching");
        let artifacts = fetch().await?;

        for artifact in artifacts.iter().filter(|a| !a.is_consistent()) {
            warn!(
                artifact_name = %artifact.artifact_name,
                version_count = artifact.version_count,
                latest_version = artifact.latest_version,
                "Artifact metadata has inconsistent version information"
            );
        }

        let mut store = self.store.write().await;
        let slot = store.entry(key.clone()).or_default();
        if slot.generation == generation {
            slot.listing = Some(CachedListing {
                artifacts: artifacts.clone(),
                fetched_at: Instant::now(),
            });
        } else {
            debug!(
                session_id = %key.session_id,
                "Listing fetched before an invalidation, not caching it"
            );
        }

        Ok(artifacts)
    }

    /// Mark the listing stale so the next read refetches.
    pub async fn invalidate(&self, key: &CacheKey) {
        let mut store = self.store.write().await;
        let slot = store.entry(key.clone()).or_default();
        slot.generation += 1;
        slot.listing = None;
        debug!(session_id = %key.session_id, generation = slot.generation, "Artifact listing invalidated");
    }

    /// Whether a read for `key` would be served without a network call.
    pub async fn is_fresh(&self, key: &CacheKey) -> bool {
        let store = self.store.read().await;
        store
            .get(key)
            .and_then(|slot| slot.listing.as_ref())
            .is_some_and(|listing| listing.fetched_at.elapsed() < self.stale_after)
    }
}
