//! The three API limiters behind one path-aware entry point.

use std::net::IpAddr;
use std::time::Instant;

use crate::{RateDecision, RateLimitPolicy, RateLimiter, RouteClass};

/// Deployment mode. Development turns limiting off entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Parses `NODE_ENV`-style values. Anything other than
    /// `development` / `dev` counts as production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// General, registration and auth limiters.
#[derive(Debug)]
pub struct RateLimiterSet {
    general: RateLimiter,
    registration: RateLimiter,
    auth: RateLimiter,
}

impl RateLimiterSet {
    /// The standard policies for `env`.
    pub fn new(env: Environment) -> Self {
        Self::with_policies(
            env,
            RateLimitPolicy::general(),
            RateLimitPolicy::registration(),
            RateLimitPolicy::auth(),
        )
    }

    pub fn with_policies(
        env: Environment,
        general: RateLimitPolicy,
        registration: RateLimitPolicy,
        auth: RateLimitPolicy,
    ) -> Self {
        let build = if env.is_development() {
            tracing::info!("rate limiting bypassed in development");
            RateLimiter::bypassed
        } else {
            RateLimiter::new
        };
        Self {
            general: build(general),
            registration: build(registration),
            auth: build(auth),
        }
    }

    /// Classifies `path` and checks it against the matching limiter.
    pub fn check(&self, path: &str, ip: IpAddr, now: Instant) -> RateDecision {
        let class = RouteClass::classify(path);
        let decision = self.limiter(class).check(ip, now);
        if let RateDecision::Limited { .. } = decision {
            tracing::info!(%ip, path, class = %class, "request rate limited");
        }
        decision
    }

    pub fn limiter(&self, class: RouteClass) -> &RateLimiter {
        match class {
            RouteClass::General => &self.general,
            RouteClass::Registration => &self.registration,
            RouteClass::Auth => &self.auth,
        }
    }

    /// Purges closed windows in every limiter.
    pub fn purge_expired(&self, now: Instant) -> usize {
        [&self.general, &self.registration, &self.auth]
            .into_iter()
            .map(|l| l.purge_expired(now))
            .sum()
    }
}

impl Default for RateLimiterSet {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}
