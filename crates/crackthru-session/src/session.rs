//! Session types: what the client knows about who is logged in.
//!
//! There is exactly one [`SessionState`] per client. Whether the user is
//! authenticated is always *derived* from it (`is_authenticated()`), never
//! stored in a second flag that could drift out of sync with the profile.

use std::time::Duration;

use crackthru_protocol::UserProfile;
use crackthru_protocol::endpoints::DEFAULT_EXPIRY_CODE;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
///
/// The server's session TTL isn't discoverable from the client, so it is
/// configuration rather than a constant. The refresh timer fires
/// `refresh_skew` before the TTL runs out.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the server keeps a session cookie valid.
    ///
    /// Default: 15 minutes.
    pub session_ttl: Duration,

    /// How long before expiry to refresh. Default: 1 minute, so the
    /// default refresh interval is 14 minutes.
    pub refresh_skew: Duration,

    /// Random extra delay (0..max) added when the refresh timer starts.
    /// Spreads refreshes from many tabs opened at the same moment.
    pub refresh_jitter: Duration,

    /// The 401 `code` that means "token expired, refresh and retry".
    pub expiry_code: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(15 * 60),
            refresh_skew: Duration::from_secs(60),
            refresh_jitter: Duration::from_secs(5),
            expiry_code: DEFAULT_EXPIRY_CODE.to_string(),
        }
    }
}

impl SessionConfig {
    /// The shortest refresh interval we allow.
    pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

    /// Fix out-of-range values so the config is safe to use.
    ///
    /// Called by `SessionManager::new`. Rules:
    /// - `refresh_skew` must be shorter than `session_ttl`; otherwise it
    ///   is reset to a tenth of the TTL.
    /// - An empty `expiry_code` falls back to the default.
    pub fn validated(mut self) -> Self {
        if self.refresh_skew >= self.session_ttl {
            tracing::warn!(
                ttl_secs = self.session_ttl.as_secs(),
                skew_secs = self.refresh_skew.as_secs(),
                "refresh_skew >= session_ttl; using ttl/10"
            );
            self.refresh_skew = self.session_ttl / 10;
        }
        if self.expiry_code.trim().is_empty() {
            self.expiry_code = DEFAULT_EXPIRY_CODE.to_string();
        }
        self
    }

    /// How often the silent refresh fires while authenticated.
    pub fn refresh_interval(&self) -> Duration {
        self.session_ttl
            .saturating_sub(self.refresh_skew)
            .max(Self::MIN_REFRESH_INTERVAL)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The client's view of the session.
///
/// ```text
///   Unknown ──(profile ok / login ok)──→ Authenticated(profile)
///      │                                     │        ↑
///      └──(profile check fails)──┐   (logout / refresh fails)
///                                ▼           ▼        │
///                            Unauthenticated ─(login / signup)
/// ```
///
/// - **Unknown**: startup, before the first profile check resolves.
///   The UI shows a spinner rather than a login button.
/// - **Authenticated**: holds the one and only profile.
/// - **Unauthenticated**: logged out. Stays here until the user logs
///   in or signs up again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unknown,
    Authenticated(UserProfile),
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// `true` while the first profile check is still pending.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The current user, if any.
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Authenticated(_) => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserProfile {
        UserProfile {
            user_id: "u-1".into(),
            name: "Asha".into(),
            email: "a@b.com".into(),
            phone: None,
            organization: None,
            country: None,
            state: None,
            enrolled_course_ids: Vec::new(),
        }
    }

    #[test]
    fn test_default_refresh_interval_is_fourteen_minutes() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(14 * 60));
        assert_eq!(cfg.expiry_code, "TOKEN_EXPIRED");
    }

    #[test]
    fn test_refresh_interval_follows_configured_ttl() {
        let cfg = SessionConfig {
            session_ttl: Duration::from_secs(60 * 60),
            refresh_skew: Duration::from_secs(5 * 60),
            ..Default::default()
        };
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(55 * 60));
    }

    #[test]
    fn test_validated_fixes_skew_longer_than_ttl() {
        let cfg = SessionConfig {
            session_ttl: Duration::from_secs(100),
            refresh_skew: Duration::from_secs(200),
            expiry_code: "  ".into(),
            ..Default::default()
        }
        .validated();
        assert_eq!(cfg.refresh_skew, Duration::from_secs(10));
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(90));
        assert_eq!(cfg.expiry_code, "TOKEN_EXPIRED");
    }

    #[test]
    fn test_refresh_interval_has_floor() {
        let cfg = SessionConfig {
            session_ttl: Duration::from_millis(500),
            refresh_skew: Duration::from_millis(100),
            ..Default::default()
        };
        assert_eq!(cfg.refresh_interval(), SessionConfig::MIN_REFRESH_INTERVAL);
    }

    #[test]
    fn test_state_flags_are_derived_from_variant() {
        assert!(SessionState::default().is_loading());
        assert!(!SessionState::Unknown.is_authenticated());

        let authed = SessionState::Authenticated(user());
        assert!(authed.is_authenticated());
        assert!(!authed.is_loading());
        assert_eq!(authed.user().map(|u| u.email.as_str()), Some("a@b.com"));

        assert!(SessionState::Unauthenticated.user().is_none());
        assert_eq!(SessionState::Unauthenticated.label(), "unauthenticated");
    }
}
