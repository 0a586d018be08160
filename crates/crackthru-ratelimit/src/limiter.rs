//! Fixed-window, per-IP request counter.
//!
//! Each client IP gets a window that opens on its first request and
//! lasts `policy.window`. Every request in the window is counted; once
//! the count passes `policy.limit` the rest are rejected until the
//! window closes and a fresh one opens.
//!
//! Closed windows are swept once per window length from inside `check`,
//! so the table only holds clients seen in roughly the last two windows.
//!
//! Time is passed in by the caller (`now`) rather than read from the
//! clock, which keeps the limiter deterministic under test.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::RateLimitPolicy;

/// The outcome of one [`RateLimiter::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    /// Let the request through.
    Allowed {
        limit: u32,
        remaining: u32,
        /// Time until the window resets.
        reset_after: Duration,
    },
    /// Reject with 429.
    Limited {
        limit: u32,
        retry_after: Duration,
        message: String,
    },
    /// Limiting is switched off (development).
    Bypassed,
}

#[derive(Serialize)]
struct RejectionBody<'a> {
    success: bool,
    message: &'a str,
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Limited { .. })
    }

    /// HTTP status to answer with: 429 when limited, otherwise `None`
    /// (the request proceeds normally).
    pub fn rejection_status(&self) -> Option<u16> {
        match self {
            Self::Limited { .. } => Some(429),
            _ => None,
        }
    }

    /// Standard `RateLimit-*` headers, plus `Retry-After` when limited.
    /// Bypassed requests get none.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Allowed {
                limit,
                remaining,
                reset_after,
            } => vec![
                ("RateLimit-Limit", limit.to_string()),
                ("RateLimit-Remaining", remaining.to_string()),
                ("RateLimit-Reset", ceil_secs(*reset_after).to_string()),
            ],
            Self::Limited {
                limit,
                retry_after,
                ..
            } => {
                let secs = ceil_secs(*retry_after).to_string();
                vec![
                    ("RateLimit-Limit", limit.to_string()),
                    ("RateLimit-Remaining", "0".to_string()),
                    ("RateLimit-Reset", secs.clone()),
                    ("Retry-After", secs),
                ]
            }
            Self::Bypassed => Vec::new(),
        }
    }

    /// The JSON body of a 429: `{"success":false,"message":"..."}`.
    pub fn rejection_body(&self) -> Option<String> {
        let Self::Limited { message, .. } = self else {
            return None;
        };
        serde_json::to_string(&RejectionBody {
            success: false,
            message,
        })
        .ok()
    }
}

/// Whole seconds, rounded up so a client never retries too early.
fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug, Default)]
struct Windows {
    clients: HashMap<IpAddr, Window>,
    last_sweep: Option<Instant>,
}

impl Windows {
    fn sweep(&mut self, now: Instant, length: Duration) -> usize {
        let before = self.clients.len();
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) < length);
        self.last_sweep = Some(now);
        before - self.clients.len()
    }

    fn sweep_due(&mut self, now: Instant, length: Duration) {
        match self.last_sweep {
            None => self.last_sweep = Some(now),
            Some(at) if now.saturating_duration_since(at) >= length => {
                let removed = self.sweep(now, length);
                if removed > 0 {
                    tracing::debug!(removed, "swept closed rate-limit windows");
                }
            }
            Some(_) => {}
        }
    }
}

/// Counts requests per IP under one [`RateLimitPolicy`].
#[derive(Debug)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    bypass: bool,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            bypass: false,
            windows: Mutex::new(Windows::default()),
        }
    }

    /// A limiter that lets everything through and counts nothing.
    pub fn bypassed(policy: RateLimitPolicy) -> Self {
        Self {
            bypass: true,
            ..Self::new(policy)
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Records one request from `ip` at `now` and decides whether it
    /// may proceed.
    pub fn check(&self, ip: IpAddr, now: Instant) -> RateDecision {
        if self.bypass {
            return RateDecision::Bypassed;
        }

        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.sweep_due(now, self.policy.window);
        let window = windows
            .clients
            .entry(ip)
            .and_modify(|w| {
                if now.saturating_duration_since(w.started) >= self.policy.window {
                    *w = Window { started: now, hits: 0 };
                }
            })
            .or_insert(Window { started: now, hits: 0 });

        window.hits = window.hits.saturating_add(1);
        let reset_after = self
            .policy
            .window
            .saturating_sub(now.saturating_duration_since(window.started));

        if window.hits > self.policy.limit {
            tracing::warn!(%ip, hits = window.hits, limit = self.policy.limit, "rate limit exceeded");
            RateDecision::Limited {
                limit: self.policy.limit,
                retry_after: reset_after,
                message: self.policy.message.clone(),
            }
        } else {
            RateDecision::Allowed {
                limit: self.policy.limit,
                remaining: self.policy.limit - window.hits,
                reset_after,
            }
        }
    }

    /// Drops windows that have closed. Returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sweep(now, self.policy.window)
    }

    /// Number of IPs with an open window.
    pub fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clients
            .len()
    }
}
