//! Offline-capable static asset cache for the CRACKTHRU site.
//!
//! Precaches the HTML shell, optimised images and fonts on install,
//! answers same-origin GETs cache-first, keeps images fetched at runtime,
//! and serves the cached shell when a page load fails offline.

mod cache;
mod config;
mod error;

pub use cache::{AssetCache, FetchOutcome, FetchRequest, RequestMode};
pub use config::{CacheConfig, DEFAULT_CACHE_NAME, DEFAULT_RUNTIME_CAPACITY};
pub use error::CacheError;
