//! Error types for the asset cache.

use crackthru_transport::TransportError;

/// Errors surfaced by [`AssetCache`](crate::AssetCache).
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A precache asset could not be fetched; nothing was stored.
    #[error("failed to precache {asset}: {reason}")]
    Install { asset: String, reason: String },

    /// The network failed and no cached fallback applied.
    #[error(transparent)]
    Network(#[from] TransportError),
}
