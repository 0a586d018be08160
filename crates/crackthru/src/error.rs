//! Unified error type for the CRACKTHRU client.

use crackthru_cache::CacheError;
use crackthru_prefetch::PrefetchError;
use crackthru_protocol::ProtocolError;
use crackthru_session::SessionError;
use crackthru_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error wrapping every crate-specific error, so `?` works
/// across layers when using the `crackthru` facade.
#[derive(Debug, thiserror::Error)]
pub enum CrackthruError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Prefetch(#[from] PrefetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Bad environment configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CrackthruError {
    /// Text fit for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Session(e) => e.user_message(),
            Self::Transport(_) | Self::Cache(CacheError::Network(_)) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: CrackthruError = TransportError::Timeout.into();
        assert!(matches!(err, CrackthruError::Transport(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: CrackthruError = ProtocolError::InvalidResponse("bad".into()).into();
        assert!(matches!(err, CrackthruError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error_keeps_server_message() {
        let err: CrackthruError = SessionError::Rejected {
            message: Some("Course is full".into()),
        }
        .into();
        assert!(matches!(err, CrackthruError::Session(_)));
        assert_eq!(err.user_message(), "Course is full");
    }

    #[test]
    fn test_from_prefetch_and_cache_errors() {
        let err: CrackthruError = PrefetchError::Cancelled.into();
        assert!(matches!(err, CrackthruError::Prefetch(_)));

        let err: CrackthruError = CacheError::Install {
            asset: "/".into(),
            reason: "status 500".into(),
        }
        .into();
        assert!(matches!(err, CrackthruError::Cache(_)));
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_from_config_error() {
        let err: CrackthruError = ConfigError::Invalid {
            key: "CRACKTHRU_SESSION_TTL_SECS",
            value: "soon".into(),
            reason: "invalid digit found in string".into(),
        }
        .into();
        assert!(err.to_string().contains("CRACKTHRU_SESSION_TTL_SECS"));
    }
}
