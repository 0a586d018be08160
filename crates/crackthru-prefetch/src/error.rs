//! Error types for route prefetching.

/// Errors a [`ChunkLoader`](crate::ChunkLoader) can report.
///
/// Prefetching is best effort: these are logged and the route is
/// un-marked so the next hover retries. Nothing propagates to the UI.
#[derive(Debug, thiserror::Error)]
pub enum PrefetchError {
    /// No chunk is registered for this route.
    #[error("no chunk registered for route {0}")]
    UnknownRoute(String),

    /// The chunk could not be fetched or evaluated.
    #[error("failed to load chunk {chunk}: {reason}")]
    LoadFailed { chunk: String, reason: String },

    /// The load was abandoned before it finished.
    #[error("prefetch cancelled")]
    Cancelled,
}
