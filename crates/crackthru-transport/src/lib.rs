//! HTTP transport abstraction layer for CRACKTHRU.
//!
//! Provides the [`HttpTransport`] trait that abstracts over how a request
//! reaches the API (a real `reqwest` client in production, an in-memory
//! mock in tests), plus [`send_with_cancel`], which races a request
//! against a cancellation token.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): [`ReqwestTransport`] with a cookie store, so
//!   the session cookie is sent with every call ("credentials: include").

mod error;
#[cfg(feature = "reqwest")]
mod http;
mod message;

pub use error::TransportError;
#[cfg(feature = "reqwest")]
pub use http::{ReqwestTransport, TransportConfig};
pub use message::{
    HttpRequest, HttpResponse, JSON_CONTENT_TYPE, Method, RequestId,
};
pub use tokio_util::sync::CancellationToken;

use std::future::Future;
use std::sync::Arc;

/// Sends requests to the API and returns raw responses.
///
/// Implementations return `Ok` for ANY HTTP status; only failures to
/// obtain a response at all are errors.
///
/// The returned future is `Send` so callers can spawn work that holds
/// it (the session manager's refresh runs inside a shared future).
pub trait HttpTransport: Send + Sync + 'static {
    /// Sends one request and waits for the full response.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

impl<T: HttpTransport> HttpTransport for Arc<T> {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).send(request)
    }
}

/// Sends `request`, aborting with [`TransportError::Cancelled`] if
/// `cancel` fires first.
///
/// An already-cancelled token short-circuits without touching the
/// network (`biased` polls the token branch first).
pub async fn send_with_cancel<T: HttpTransport>(
    transport: &T,
    request: HttpRequest,
    cancel: &CancellationToken,
) -> Result<HttpResponse, TransportError> {
    let id = request.id;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(%id, "request cancelled");
            Err(TransportError::Cancelled)
        }
        result = transport.send(request) => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Never answers. Lets us prove that cancellation wins the race.
    struct HangingTransport {
        calls: AtomicUsize,
    }

    impl HttpTransport for HangingTransport {
        async fn send(
            &self,
            _request: HttpRequest,
        ) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    struct OkTransport;

    impl HttpTransport for OkTransport {
        async fn send(
            &self,
            _request: HttpRequest,
        ) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(200, "{}"))
        }
    }

    #[tokio::test]
    async fn test_send_with_cancel_precancelled_skips_network() {
        let transport = HangingTransport {
            calls: AtomicUsize::new(0),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result =
            send_with_cancel(&transport, HttpRequest::get("/x"), &cancel).await;

        assert!(matches!(result, Err(TransportError::Cancelled)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_with_cancel_aborts_in_flight_request() {
        let transport = Arc::new(HangingTransport {
            calls: AtomicUsize::new(0),
        });
        let cancel = CancellationToken::new();

        let task = {
            let transport = Arc::clone(&transport);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                send_with_cancel(&transport, HttpRequest::get("/x"), &cancel)
                    .await
            })
        };

        tokio::task::yield_now().await;
        cancel.cancel();

        let result = task.await.expect("task should complete");
        assert!(matches!(result, Err(TransportError::Cancelled)));
    }

    #[tokio::test]
    async fn test_send_with_cancel_passes_response_through() {
        let cancel = CancellationToken::new();
        let res =
            send_with_cancel(&OkTransport, HttpRequest::get("/x"), &cancel)
                .await
                .expect("should succeed");
        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn test_arc_transport_delegates() {
        let transport = Arc::new(OkTransport);
        let res = transport
            .send(HttpRequest::get("/x"))
            .await
            .expect("should succeed");
        assert!(res.is_success());
    }
}
