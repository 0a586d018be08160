//! Cache-first asset cache with an offline fallback for page loads.
//!
//! ```text
//! request ──→ same-origin GET? ──no──→ Passthrough
//!                   │ yes
//!              cached? ──yes──→ Cached(response)
//!                   │ no
//!              network ──ok──→ image? store a copy ──→ Network(response)
//!                   │ err
//!            navigation? ──yes + "/" cached──→ Fallback(shell)
//!                   │ no
//!               Err(Network)
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crackthru_transport::{HttpRequest, HttpResponse, HttpTransport, Method};

use crate::{CacheConfig, CacheError};

/// The document served when a page load fails offline.
const SHELL_PATH: &str = "/";

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp", ".avif", ".gif", ".svg", ".ico"];

/// What kind of load a request is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// A top-level page load.
    Navigate,
    #[default]
    Other,
}

/// A request as the asset cache sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    /// Site-relative path, e.g. `/images/optimized/logo.webp`.
    pub path: String,
    pub mode: RequestMode,
    /// `false` for third-party hosts (analytics, CDNs).
    pub same_origin: bool,
}

impl FetchRequest {
    /// A same-origin subresource GET.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            mode: RequestMode::Other,
            same_origin: true,
        }
    }

    /// A same-origin page load.
    pub fn navigate(path: impl Into<String>) -> Self {
        Self {
            mode: RequestMode::Navigate,
            ..Self::get(path)
        }
    }

    pub fn cross_origin(mut self) -> Self {
        self.same_origin = false;
        self
    }
}

/// How a fetch was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not ours to handle; let the request go out untouched.
    Passthrough,
    Cached(HttpResponse),
    Network(HttpResponse),
    /// The network failed on a page load; this is the cached shell.
    Fallback(HttpResponse),
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Passthrough => None,
            Self::Cached(r) | Self::Network(r) | Self::Fallback(r) => Some(r),
        }
    }
}

#[derive(Default)]
struct Entries {
    responses: HashMap<String, HttpResponse>,
    /// Runtime-cached paths, oldest first.
    runtime: VecDeque<String>,
}

impl Entries {
    fn store_runtime(&mut self, path: String, response: HttpResponse, capacity: usize) {
        if capacity == 0 {
            return;
        }
        if self.responses.insert(path.clone(), response).is_some() {
            return;
        }
        self.runtime.push_back(path);
        while self.runtime.len() > capacity {
            if let Some(oldest) = self.runtime.pop_front() {
                self.responses.remove(&oldest);
                tracing::trace!(evicted = %oldest, "runtime image cache full");
            }
        }
    }
}

/// A single named cache of static assets.
pub struct AssetCache<T: HttpTransport> {
    transport: T,
    config: CacheConfig,
    entries: Mutex<Entries>,
}

impl<T: HttpTransport> AssetCache<T> {
    pub fn new(transport: T, config: CacheConfig) -> Self {
        Self {
            transport,
            config,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Fetches every precache asset. All or nothing: if any asset fails,
    /// nothing is stored and the error names the culprit.
    pub async fn install(&self) -> Result<usize, CacheError> {
        let mut fetched = Vec::with_capacity(self.config.precache.len());
        for path in &self.config.precache {
            let response = self
                .transport
                .send(HttpRequest::get(path.as_str()))
                .await
                .map_err(|e| CacheError::Install {
                    asset: path.clone(),
                    reason: e.to_string(),
                })?;
            if !response.is_success() {
                return Err(CacheError::Install {
                    asset: path.clone(),
                    reason: format!("status {}", response.status),
                });
            }
            fetched.push((path.clone(), response));
        }

        let count = fetched.len();
        let mut entries = self.entries();
        entries.runtime.retain(|p| !self.config.precache.contains(p));
        entries.responses.extend(fetched);
        drop(entries);
        tracing::info!(cache = %self.config.name, assets = count, "precache installed");
        Ok(count)
    }

    /// Given the names of every cache present, returns the ones to
    /// delete: all of them except this cache.
    pub fn activate(&self, existing: &[String]) -> Vec<String> {
        let stale: Vec<String> = existing
            .iter()
            .filter(|name| **name != self.config.name)
            .cloned()
            .collect();
        if !stale.is_empty() {
            tracing::info!(cache = %self.config.name, ?stale, "deleting old caches");
        }
        stale
    }

    /// Answers one request.
    ///
    /// # Errors
    /// [`CacheError::Network`] when the network fails and no cached
    /// fallback applies.
    pub async fn handle_fetch(
        &self,
        request: &FetchRequest,
    ) -> Result<FetchOutcome, CacheError> {
        if request.method != Method::Get || !request.same_origin {
            return Ok(FetchOutcome::Passthrough);
        }

        if let Some(hit) = self.lookup(&request.path) {
            tracing::trace!(path = %request.path, "cache hit");
            return Ok(FetchOutcome::Cached(hit));
        }

        match self.transport.send(HttpRequest::get(request.path.as_str())).await {
            Ok(response) => {
                if response.is_success() && is_image(&request.path, &response) {
                    tracing::debug!(path = %request.path, "caching image");
                    self.entries().store_runtime(
                        request.path.clone(),
                        response.clone(),
                        self.config.runtime_capacity,
                    );
                }
                Ok(FetchOutcome::Network(response))
            }
            Err(e) if request.mode == RequestMode::Navigate => {
                match self.lookup(SHELL_PATH) {
                    Some(shell) => {
                        tracing::debug!(path = %request.path, error = %e, "offline; serving cached shell");
                        Ok(FetchOutcome::Fallback(shell))
                    }
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A cached response, if any.
    pub fn lookup(&self, path: &str) -> Option<HttpResponse> {
        self.entries().responses.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries().responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().responses.is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Images are the only thing cached at runtime.
fn is_image(path: &str, response: &HttpResponse) -> bool {
    let by_type = response
        .header("content-type")
        .is_some_and(|ct| ct.trim_start().starts_with("image/"));
    let lower = path.split('?').next().unwrap_or_default().to_ascii_lowercase();
    by_type || IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
