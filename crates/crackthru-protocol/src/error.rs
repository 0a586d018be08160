//! Error types for the protocol layer.
//!
//! Each crate in CRACKTHRU defines its own error enum. A `ProtocolError`
//! always means "the bytes and the Rust types didn't line up", never a
//! network or authentication problem.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: an HTML error page where JSON was expected,
    /// missing required fields, or a truncated body.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The body parsed but breaks an API rule, e.g. `success: true`
    /// without the payload the endpoint promises.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
