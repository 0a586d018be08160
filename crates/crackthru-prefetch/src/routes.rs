//! Route table: which code chunk backs which page.

use std::collections::HashMap;
use std::fmt;

/// Identifier of a lazily loaded code chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkId(String);

impl ChunkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps route paths to the chunk that renders them.
///
/// Lookups go through [`normalize`], so `/programs/`, `/programs?ref=nav`
/// and `/programs#faq` all resolve to the `/programs` entry.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, ChunkId>,
}

impl RouteTable {
    /// An empty table. Nothing resolves until routes are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pages of the CRACKTHRU site.
    pub fn site() -> Self {
        [
            ("/", "home"),
            ("/about", "about"),
            ("/programs", "programs"),
            ("/pricing", "pricing"),
            ("/contact", "contact"),
            ("/login", "login"),
            ("/signup", "signup"),
            ("/dashboard", "dashboard"),
            ("/privacy-policy", "privacy-policy"),
            ("/terms", "terms"),
        ]
        .into_iter()
        .fold(Self::new(), |table, (path, chunk)| table.with_route(path, chunk))
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_route(mut self, path: &str, chunk: impl Into<String>) -> Self {
        self.insert(path, chunk);
        self
    }

    /// Registers (or replaces) the chunk for `path`.
    pub fn insert(&mut self, path: &str, chunk: impl Into<String>) {
        self.routes.insert(normalize(path), ChunkId::new(chunk));
    }

    /// The chunk for `path`, if the route is known.
    pub fn resolve(&self, path: &str) -> Option<&ChunkId> {
        self.routes.get(&normalize(path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Canonical form of a route path: leading slash, no query string, no
/// fragment, no trailing slash (except for the root itself).
pub fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim().trim_end_matches('/');

    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
