/// Errors that can occur in the transport layer.
///
/// Everything here means "the request never produced an HTTP response".
/// A 4xx/5xx status is NOT a transport error; it's a perfectly good
/// response that higher layers interpret.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not reach the server (DNS, refused connection, TLS).
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Sending the request failed after the connection was made.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading the response body failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The request didn't complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request was aborted through its cancellation token.
    #[error("request cancelled")]
    Cancelled,

    /// The request couldn't be built (bad base URL, bad header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
