//! Rate limit policies and route classification.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How many requests one IP may make per window, and what to tell it
/// once it has made too many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Requests allowed per window.
    pub limit: u32,
    pub window: Duration,
    /// Sent in the 429 body.
    pub message: String,
}

impl RateLimitPolicy {
    pub fn new(limit: u32, window: Duration, message: impl Into<String>) -> Self {
        Self {
            limit,
            window,
            message: message.into(),
        }
    }

    /// Every API route: 100 requests per 15 minutes.
    pub fn general() -> Self {
        Self::new(
            100,
            Duration::from_secs(15 * 60),
            "Too many requests from this IP, please try again later.",
        )
    }

    /// Account and program registration: 5 attempts per hour.
    pub fn registration() -> Self {
        Self::new(
            5,
            Duration::from_secs(60 * 60),
            "Too many registration attempts from this IP, please try again after an hour.",
        )
    }

    /// Login, refresh and the other auth endpoints: 10 per 15 minutes.
    pub fn auth() -> Self {
        Self::new(
            10,
            Duration::from_secs(15 * 60),
            "Too many authentication attempts, please try again later.",
        )
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::general()
    }
}

/// Which policy a request path falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    General,
    Registration,
    Auth,
}

impl RouteClass {
    /// Classifies a request path, ignoring any query string.
    ///
    /// `/auth/register` and anything under `/registrations` count as
    /// registration; the rest of `/auth` is auth; everything else is
    /// general. An `/api` prefix is ignored.
    pub fn classify(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.strip_prefix("/api").unwrap_or(path);

        if path == "/auth/register"
            || path.starts_with("/auth/register/")
            || path == "/registrations"
            || path.starts_with("/registrations/")
        {
            Self::Registration
        } else if path == "/auth" || path.starts_with("/auth/") {
            Self::Auth
        } else {
            Self::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Registration => "registration",
            Self::Auth => "auth",
        }
    }
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
