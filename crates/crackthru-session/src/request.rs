//! Authenticated request wrapper: one refresh-and-retry per call.
//!
//! ```text
//! send ──→ 401 + expiry code? ──no──→ return response
//!               │ yes
//!               ▼
//!           refresh() ──fail──→ (logout already ran) return ORIGINAL response
//!               │ ok
//!               ▼
//!          resend identical request ──→ return whatever comes back
//! ```
//!
//! There is never a second retry and never a backoff. Only the expiry
//! code counts as recoverable; every other status passes straight
//! through for the caller to interpret.

use crackthru_protocol::Codec;
use crackthru_transport::{
    CancellationToken, HttpRequest, HttpResponse, HttpTransport,
    send_with_cancel,
};

use crate::{SessionError, SessionManager};

impl<T: HttpTransport, C: Codec> SessionManager<T, C> {
    /// Sends a request to a protected endpoint, refreshing the session
    /// and retrying once if the server says the token expired.
    ///
    /// # Errors
    /// Only transport failures (including cancellation through
    /// `cancel`) are errors. HTTP error statuses come back as `Ok`.
    pub async fn fetch_with_auth(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, SessionError> {
        let response =
            send_with_cancel(self.transport(), request.clone(), cancel).await?;

        if !self.is_expiry_signal(&response) {
            return Ok(response);
        }

        tracing::debug!(id = %request.id, path = %request.path, "access token expired; refreshing");
        if !self.refresh().await {
            return Ok(response);
        }

        tracing::debug!(id = %request.id, path = %request.path, "retrying after refresh");
        Ok(send_with_cancel(self.transport(), request, cancel).await?)
    }

    /// [`fetch_with_auth`](Self::fetch_with_auth) with a session-scoped
    /// token, so the call is aborted by the next logout.
    pub async fn fetch(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, SessionError> {
        let cancel = self.scope();
        self.fetch_with_auth(request, &cancel).await
    }

    /// `true` if `response` is a 401 carrying the configured expiry code.
    pub fn is_expiry_signal(&self, response: &HttpResponse) -> bool {
        if response.status != 401 {
            return false;
        }
        self.codec()
            .decode_response(&response.body)
            .is_ok_and(|envelope| envelope.has_code(&self.config().expiry_code))
    }
}
