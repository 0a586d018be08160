//! Client configuration from environment variables.
//!
//! | Variable                       | Default                     |
//! |--------------------------------|-----------------------------|
//! | `CRACKTHRU_API_URL`            | `http://localhost:5000/api` |
//! | `CRACKTHRU_ENV` / `NODE_ENV`   | `production`                |
//! | `CRACKTHRU_SESSION_TTL_SECS`   | `900`                       |
//! | `CRACKTHRU_REFRESH_SKEW_SECS`  | `60`                        |
//! | `CRACKTHRU_EXPIRY_CODE`        | `TOKEN_EXPIRED`             |
//! | `CRACKTHRU_TIMEOUT_SECS`       | `30`                        |

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crackthru_ratelimit::Environment;
use crackthru_session::SessionConfig;
use crackthru_transport::TransportConfig;
use tracing::{debug, warn};

pub const API_URL: &str = "CRACKTHRU_API_URL";
pub const ENV: &str = "CRACKTHRU_ENV";
pub const NODE_ENV: &str = "NODE_ENV";
pub const SESSION_TTL_SECS: &str = "CRACKTHRU_SESSION_TTL_SECS";
pub const REFRESH_SKEW_SECS: &str = "CRACKTHRU_REFRESH_SKEW_SECS";
pub const EXPIRY_CODE: &str = "CRACKTHRU_EXPIRY_CODE";
pub const TIMEOUT_SECS: &str = "CRACKTHRU_TIMEOUT_SECS";

/// A variable was set to something unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the client needs to know about its deployment.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    pub session: SessionConfig,
    /// Development turns rate limiting off.
    pub environment: Environment,
}

impl ClientConfig {
    /// Reads the process environment. Unset variables keep their
    /// defaults; set but malformed ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL).filter(|v| !v.trim().is_empty()) {
            config.transport.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = try_load::<u64>(&lookup, TIMEOUT_SECS)? {
            config.transport.timeout = Duration::from_secs(secs);
        }

        if let Some(env) = lookup(ENV).or_else(|| lookup(NODE_ENV)) {
            config.environment = Environment::parse(&env);
        }

        if let Some(secs) = try_load::<u64>(&lookup, SESSION_TTL_SECS)? {
            config.session.session_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = try_load::<u64>(&lookup, REFRESH_SKEW_SECS)? {
            config.session.refresh_skew = Duration::from_secs(secs);
        }
        if let Some(code) = lookup(EXPIRY_CODE).filter(|v| !v.trim().is_empty()) {
            config.session.expiry_code = code.trim().to_string();
        }

        config.session = config.session.validated();
        debug!(
            api_url = %config.transport.base_url,
            environment = ?config.environment,
            refresh_interval_secs = config.session.refresh_interval().as_secs(),
            "client configuration loaded"
        );
        Ok(config)
    }
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim().parse().map(Some).map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}
