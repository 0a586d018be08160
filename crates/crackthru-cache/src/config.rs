//! Cache name and precache list.

/// Name of the current cache generation. Bumping it makes `activate`
/// discard every older cache.
pub const DEFAULT_CACHE_NAME: &str = "crackthru-v1";

/// Images kept from runtime fetches before the oldest is dropped.
pub const DEFAULT_RUNTIME_CAPACITY: usize = 64;

/// Asset cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub name: String,
    /// Paths fetched and stored on install.
    pub precache: Vec<String>,
    /// Cap on images cached at runtime. Precached assets don't count.
    pub runtime_capacity: usize,
}

impl CacheConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            precache: Vec::new(),
            runtime_capacity: DEFAULT_RUNTIME_CAPACITY,
        }
    }

    pub fn with_asset(mut self, path: impl Into<String>) -> Self {
        self.precache.push(path.into());
        self
    }

    pub fn with_runtime_capacity(mut self, capacity: usize) -> Self {
        self.runtime_capacity = capacity;
        self
    }
}

impl Default for CacheConfig {
    /// The HTML shell, the optimised hero and logo images, and the
    /// self-hosted fonts.
    fn default() -> Self {
        [
            "/",
            "/index.html",
            "/manifest.json",
            "/images/optimized/logo.webp",
            "/images/optimized/hero-bg.webp",
            "/images/optimized/innovation.webp",
            "/fonts/inter-var.woff2",
        ]
        .into_iter()
        .fold(Self::new(DEFAULT_CACHE_NAME), CacheConfig::with_asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_precaches_shell() {
        let config = CacheConfig::default();
        assert_eq!(config.name, "crackthru-v1");
        assert!(config.precache.iter().any(|p| p == "/"));
        assert!(config.precache.iter().any(|p| p.ends_with(".woff2")));
    }
}
