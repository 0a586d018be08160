//! Error types for the session layer.

use crackthru_protocol::{ApiResponse, FieldError, ProtocolError};
use crackthru_transport::TransportError;

/// Errors surfaced by session operations.
///
/// Only the write paths (login, signup, enroll) return these to the
/// caller. Read paths (profile check, enrollment list) log them and
/// degrade to an empty or logged-out state instead.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server rejected the input (4xx with field-level messages).
    #[error("validation failed: {}", message.as_deref().unwrap_or("invalid input"))]
    Validation {
        message: Option<String>,
        fields: Vec<FieldError>,
    },

    /// 401. `code` distinguishes an expired token from a bad one.
    #[error("unauthorized: {}", message.as_deref().unwrap_or("not authenticated"))]
    Unauthorized {
        code: Option<String>,
        message: Option<String>,
    },

    /// Any other non-2xx status.
    #[error("server error {status}: {}", message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// A 2xx response whose body says `success: false`.
    #[error("request rejected: {}", message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    /// The operation requires a logged-in user and there is none.
    #[error("not logged in")]
    NotAuthenticated,

    /// The request never got a response (network down, cancelled).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl SessionError {
    /// Classifies a non-2xx response.
    ///
    /// `envelope` is `None` when the body wasn't a readable API envelope
    /// (an HTML error page from a proxy, for instance); the status code
    /// alone then decides the variant.
    pub fn from_status(status: u16, envelope: Option<ApiResponse>) -> Self {
        let ApiResponse {
            message,
            code,
            errors,
            ..
        } = envelope.unwrap_or_default();

        match status {
            401 => Self::Unauthorized { code, message },
            400..=499 if !errors.is_empty() || matches!(status, 400 | 422) => {
                Self::Validation {
                    message,
                    fields: errors,
                }
            }
            _ => Self::Server { status, message },
        }
    }

    /// `true` for failures caused by the network rather than the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Text suitable for a toast: the server's own message when it sent
    /// one, a generic fallback otherwise.
    pub fn user_message(&self) -> String {
        let server_message = match self {
            Self::Validation { message, fields } => message
                .clone()
                .or_else(|| fields.first().map(|f| f.message.clone())),
            Self::Unauthorized { message, .. }
            | Self::Server { message, .. }
            | Self::Rejected { message } => message.clone(),
            _ => None,
        };

        server_message.unwrap_or_else(|| {
            match self {
                Self::Validation { .. } => "Please check the form and try again.",
                Self::Unauthorized { .. } | Self::NotAuthenticated => {
                    "Please log in to continue."
                }
                Self::Transport(TransportError::Cancelled) => "Request cancelled.",
                Self::Transport(_) => {
                    "Unable to reach the server. Check your connection and try again."
                }
                _ => "Something went wrong. Please try again.",
            }
            .to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(message: &str) -> ApiResponse {
        ApiResponse::failure(message)
    }

    #[test]
    fn test_from_status_401_keeps_code() {
        let err = SessionError::from_status(
            401,
            Some(envelope("Token expired").with_code("TOKEN_EXPIRED")),
        );
        assert!(matches!(
            err,
            SessionError::Unauthorized { code: Some(ref c), .. } if c == "TOKEN_EXPIRED"
        ));
    }

    #[test]
    fn test_from_status_400_is_validation() {
        let mut env = envelope("Validation failed");
        env.errors.push(FieldError {
            field: "email".into(),
            message: "Invalid email".into(),
        });
        let err = SessionError::from_status(400, Some(env));
        match err {
            SessionError::Validation { fields, .. } => {
                assert_eq!(fields[0].field, "email");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_from_status_409_without_fields_is_server_error() {
        let err = SessionError::from_status(409, Some(envelope("User exists")));
        assert!(matches!(err, SessionError::Server { status: 409, .. }));
    }

    #[test]
    fn test_from_status_unreadable_body_uses_status_only() {
        let err = SessionError::from_status(502, None);
        assert!(matches!(
            err,
            SessionError::Server {
                status: 502,
                message: None
            }
        ));
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = SessionError::from_status(401, Some(envelope("Invalid credentials")));
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn test_user_message_falls_back_to_first_field_error() {
        let err = SessionError::Validation {
            message: None,
            fields: vec![FieldError {
                field: "password".into(),
                message: "Password too short".into(),
            }],
        };
        assert_eq!(err.user_message(), "Password too short");
    }

    #[test]
    fn test_user_message_generic_fallbacks() {
        let err = SessionError::Transport(TransportError::Timeout);
        assert!(err.is_transport());
        assert!(err.user_message().contains("Unable to reach the server"));

        let err = SessionError::from_status(500, None);
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }
}
