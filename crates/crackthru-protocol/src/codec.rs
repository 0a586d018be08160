//! Codec trait and implementations for request/response bodies.
//!
//! The session layer doesn't care HOW bodies are serialized; it holds
//! something that implements [`Codec`]. Today that's [`JsonCodec`]
//! because the API speaks JSON, and tests can swap in a codec that
//! fails on purpose to exercise the error paths.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ApiResponse, ProtocolError};

/// Encodes request bodies and decodes response bodies.
///
/// - `Send + Sync + 'static` → the codec lives inside the session
///   manager, which is shared across tasks.
/// - `decode` uses `DeserializeOwned` so the decoded value doesn't
///   borrow the response buffer.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes an API envelope, treating an empty body as an empty
    /// (unsuccessful) envelope.
    ///
    /// Some endpoints answer `204` or a bare `401` with no body at all;
    /// the caller still wants an envelope to inspect.
    fn decode_response(&self, data: &[u8]) -> Result<ApiResponse, ProtocolError> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiResponse::default());
        }
        self.decode(data)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use crackthru_protocol::{Codec, Credentials, JsonCodec};
///
/// let codec = JsonCodec;
/// let body = codec.encode(&Credentials::new("a@b.com", "secret123")).unwrap();
/// let back: Credentials = codec.decode(&body).unwrap();
/// assert_eq!(back.email, "a@b.com");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
