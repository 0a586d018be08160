//! # CRACKTHRU
//!
//! Client core for the CRACKTHRU innovation program site.
//!
//! ```text
//! crackthru (this crate)  ← builder, config, logging, unified errors
//!   ├── crackthru-session    session state, silent refresh, retry-on-expiry
//!   ├── crackthru-prefetch   hover/touch route chunk prefetching
//!   ├── crackthru-cache      cache-first static assets, offline shell
//!   ├── crackthru-ratelimit  per-IP API limits (server side)
//!   ├── crackthru-protocol   JSON bodies and endpoints
//!   └── crackthru-transport  HTTP with a cookie store
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crackthru::prelude::*;
//!
//! let _logs = crackthru::logging::init()?;
//! let client = CrackthruClientBuilder::new()
//!     .config(ClientConfig::from_env()?)
//!     .build(my_chunk_loader)
//!     .await?;
//!
//! client.session().login("a@b.com", "secret123").await?;
//! let enrollments = client.session().get_enrollments().await;
//! ```

mod client;
pub mod config;
mod error;
pub mod logging;

pub use client::{CrackthruClient, CrackthruClientBuilder};
pub use config::{ClientConfig, ConfigError};
pub use error::CrackthruError;

pub use crackthru_cache as cache;
pub use crackthru_prefetch as prefetch;
pub use crackthru_protocol as protocol;
pub use crackthru_ratelimit as ratelimit;
pub use crackthru_session as session;
pub use crackthru_transport as transport;

pub mod prelude {
    pub use crate::logging::LogBuffer;
    pub use crate::{ClientConfig, CrackthruClient, CrackthruClientBuilder, CrackthruError};
    pub use crackthru_cache::{AssetCache, CacheConfig, FetchOutcome, FetchRequest};
    pub use crackthru_prefetch::{ChunkId, ChunkLoader, PrefetchLink, RoutePrefetcher, RouteTable};
    pub use crackthru_protocol::{Enrollment, SignupForm, UserProfile};
    pub use crackthru_ratelimit::{Environment, RateDecision, RateLimiterSet};
    pub use crackthru_session::{SessionConfig, SessionError, SessionManager, SessionState};
    pub use crackthru_transport::{HttpRequest, HttpResponse, HttpTransport};
}
