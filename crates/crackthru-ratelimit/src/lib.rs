//! Per-IP rate limiting for the CRACKTHRU API.
//!
//! Three fixed-window policies protect the backend: a general one for
//! every route, a strict one for registrations, and one for the auth
//! endpoints. [`RateLimiterSet`] picks the right one from the request
//! path; development deployments bypass limiting altogether.

mod limiter;
mod policy;
mod set;

pub use limiter::{RateDecision, RateLimiter};
pub use policy::{RateLimitPolicy, RouteClass};
pub use set::{Environment, RateLimiterSet};
