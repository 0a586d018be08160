//! A navigation link that prefetches its target on hover or touch.

use tokio::task::JoinHandle;

use crate::{ChunkLoader, RoutePrefetcher};

/// A link to an in-app route.
///
/// The UI forwards pointer and touch events here; the link asks the
/// shared [`RoutePrefetcher`] to warm the target page's chunk.
pub struct PrefetchLink<L: ChunkLoader> {
    href: String,
    prefetch: bool,
    prefetcher: RoutePrefetcher<L>,
}

impl<L: ChunkLoader> PrefetchLink<L> {
    pub fn new(prefetcher: RoutePrefetcher<L>, href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            prefetch: true,
            prefetcher,
        }
    }

    /// Turns prefetching off for this link only.
    pub fn without_prefetch(mut self) -> Self {
        self.prefetch = false;
        self
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn on_pointer_enter(&self) -> Option<JoinHandle<bool>> {
        self.trigger("pointer_enter")
    }

    pub fn on_touch_start(&self) -> Option<JoinHandle<bool>> {
        self.trigger("touch_start")
    }

    fn trigger(&self, event: &'static str) -> Option<JoinHandle<bool>> {
        if !self.prefetch || !self.prefetcher.config().hover_enabled {
            return None;
        }
        tracing::trace!(href = %self.href, event, "link prefetch");
        self.prefetcher.prefetch_route(&self.href)
    }
}
