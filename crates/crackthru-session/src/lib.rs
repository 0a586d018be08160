//! Session management for the CRACKTHRU client.
//!
//! This crate owns everything about "who is logged in":
//!
//! 1. **Session state**: a single [`SessionState`] value (unknown,
//!    authenticated with a profile, or unauthenticated)
//! 2. **Session manager**: login, signup, logout, profile check,
//!    enrollments ([`SessionManager`])
//! 3. **Silent refresh**: a [`RefreshTimer`]-driven loop plus
//!    single-flight on-demand refresh
//! 4. **Authenticated requests**: one refresh-and-retry when a protected
//!    call reports an expired token ([`SessionManager::fetch_with_auth`])
//!
//! # How it fits in the stack
//!
//! ```text
//! UI / CLI (above)  ← reads state, calls login/logout/enroll
//!     ↕
//! Session Layer (this crate)  ← owns the session, retries on expiry
//!     ↕
//! Protocol + Transport (below)  ← JSON bodies over HTTP with cookies
//! ```

mod error;
mod manager;
mod request;
mod session;
mod timer;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{SessionConfig, SessionState};
pub use timer::RefreshTimer;
