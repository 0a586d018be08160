//! Route prefetching for the CRACKTHRU client.
//!
//! Pages are split into lazily loaded chunks. Hovering or touching a
//! link starts loading the target page's chunk early, and a small
//! bounded registry makes sure each route is only loaded once.
//!
//! - [`RouteTable`] maps paths to chunks
//! - [`PrefetchRegistry`] remembers what was already requested
//! - [`RoutePrefetcher`] ties them to a [`ChunkLoader`]
//! - [`PrefetchLink`] is the UI-facing trigger

mod error;
mod link;
mod prefetcher;
pub mod registry;
mod routes;

pub use error::PrefetchError;
pub use link::PrefetchLink;
pub use prefetcher::{ChunkLoader, PrefetchConfig, RoutePrefetcher};
pub use registry::{Mark, PrefetchRegistry};
pub use routes::{ChunkId, RouteTable, normalize};
