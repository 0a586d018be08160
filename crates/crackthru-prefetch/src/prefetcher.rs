//! The route prefetcher: warms code chunks before the user navigates.
//!
//! ```text
//! hover/touch ──→ prefetch_route(path)
//!                     │
//!          known route? ──no──→ ignore
//!                     │ yes
//!          already recorded? ──yes──→ ignore
//!                     │ no
//!          record it NOW, then spawn loader.load(chunk)
//!                     │
//!               load failed? ──yes──→ un-record (next hover retries)
//! ```
//!
//! Recording before the load starts is what makes two back-to-back
//! hovers issue a single chunk load.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{ChunkId, PrefetchError, PrefetchRegistry, RouteTable, normalize};

/// Loads one code chunk. The browser's dynamic `import()` in a web
/// build; a test double in tests.
pub trait ChunkLoader: Send + Sync + 'static {
    fn load(
        &self,
        chunk: &ChunkId,
    ) -> impl Future<Output = Result<(), PrefetchError>> + Send;
}

impl<L: ChunkLoader> ChunkLoader for Arc<L> {
    fn load(
        &self,
        chunk: &ChunkId,
    ) -> impl Future<Output = Result<(), PrefetchError>> + Send {
        (**self).load(chunk)
    }
}

/// Prefetcher settings.
#[derive(Debug, Clone)]
pub struct PrefetchConfig {
    /// How many routes the registry remembers.
    pub registry_capacity: usize,
    /// When `false`, links never prefetch on hover or touch.
    pub hover_enabled: bool,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            registry_capacity: crate::registry::DEFAULT_CAPACITY,
            hover_enabled: true,
        }
    }
}

/// Deduplicating route prefetcher. Cheap to clone; clones share the
/// registry.
pub struct RoutePrefetcher<L: ChunkLoader> {
    inner: Arc<Inner<L>>,
}

struct Inner<L> {
    loader: L,
    routes: RouteTable,
    config: PrefetchConfig,
    registry: Mutex<PrefetchRegistry>,
}

impl<L: ChunkLoader> Clone for RoutePrefetcher<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: ChunkLoader> RoutePrefetcher<L> {
    pub fn new(loader: L, routes: RouteTable, config: PrefetchConfig) -> Self {
        let registry = PrefetchRegistry::new(config.registry_capacity);
        Self {
            inner: Arc::new(Inner {
                loader,
                routes,
                config,
                registry: Mutex::new(registry),
            }),
        }
    }

    pub fn config(&self) -> &PrefetchConfig {
        &self.inner.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }

    /// Starts loading the chunk behind `path` unless that already
    /// happened.
    ///
    /// Returns the spawned load (resolving to `true` on success), or
    /// `None` when nothing was started: the route is unknown or already
    /// recorded. Must be called from within a Tokio runtime.
    pub fn prefetch_route(&self, path: &str) -> Option<JoinHandle<bool>> {
        let key = normalize(path);
        let Some(chunk) = self.inner.routes.resolve(&key).cloned() else {
            tracing::trace!(path = %key, "no chunk for route");
            return None;
        };

        let Some(mark) = self.registry().insert(&key) else {
            tracing::trace!(path = %key, "already prefetched");
            return None;
        };

        tracing::debug!(path = %key, %chunk, "prefetching route");
        let this = self.clone();
        Some(tokio::spawn(async move {
            match this.inner.loader.load(&chunk).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(path = %key, %chunk, error = %e, "prefetch failed");
                    this.registry().release(&key, mark);
                    false
                }
            }
        }))
    }

    /// Prefetches `paths` in the background after `delay`.
    ///
    /// Used to warm the routes a visitor is likely to open next. The
    /// batch is abandoned if `cancel` fires before it starts; loads
    /// already started run to completion. The handle resolves to the
    /// number of chunks that loaded successfully.
    pub fn prefetch_routes<I, S>(
        &self,
        paths: I,
        delay: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        let this = self.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(count = paths.len(), "batch prefetch cancelled");
                    return 0;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let handles: Vec<_> = paths
                .iter()
                .filter_map(|path| this.prefetch_route(path))
                .collect();

            let mut loaded = 0;
            for handle in handles {
                if matches!(handle.await, Ok(true)) {
                    loaded += 1;
                }
            }
            tracing::debug!(requested = paths.len(), loaded, "batch prefetch done");
            loaded
        })
    }

    /// `true` if `path` is currently recorded as prefetched (or in
    /// flight).
    pub fn is_prefetched(&self, path: &str) -> bool {
        self.registry().contains(&normalize(path))
    }

    /// Number of routes currently recorded.
    pub fn prefetched_count(&self) -> usize {
        self.registry().len()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, PrefetchRegistry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
