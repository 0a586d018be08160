//! The session manager: owns the client's one and only session.
//!
//! Responsibilities:
//! - Logging in, signing up, and logging out
//! - Checking the session on startup (`check_auth`)
//! - Silently refreshing the session cookie, on a timer and on demand
//! - Listing and creating course enrollments
//!
//! # Concurrency
//!
//! `SessionManager` is a cheap `Clone` handle around an `Arc`. Every
//! clone sees the same state, which lives in a `tokio::sync::watch`
//! channel so UI code can `subscribe()` and re-render on change.
//!
//! Refreshes are single-flight: the timer and any number of 401-driven
//! retries all await the same in-flight refresh instead of racing each
//! other to the server.
//!
//! Every request carries a [`CancellationToken`]. Session-scoped
//! requests hang off a scope token that `logout()` cancels, and the
//! whole tree hangs off a root token that `shutdown()` cancels.

use std::sync::{Arc, PoisonError};

use crackthru_protocol::{
    ApiResponse, Codec, Credentials, EnrollRequest, Enrollment, JsonCodec,
    ProtocolError, SignupForm, UserProfile, endpoints,
};
use crackthru_transport::{
    CancellationToken, HttpRequest, HttpResponse, HttpTransport,
    TransportError, send_with_cancel,
};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::{RefreshTimer, SessionConfig, SessionError, SessionState};

/// A refresh that other callers can join.
type RefreshFlight = Shared<BoxFuture<'static, bool>>;

/// Manages the client session.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ check_auth() ──→ [Authenticated] ──(every refresh_interval)──→ refresh()
///   │             │                │      ↑                                  │
///   │             ▼                │      └────────────(ok)──────────────────┘
///   │      [Unauthenticated] ←─────┴──(logout() / refresh fails)─────────────┘
///   │             │
///   └─────────────┴──→ login() / signup() ──→ [Authenticated]
/// ```
pub struct SessionManager<T: HttpTransport, C: Codec = JsonCodec> {
    inner: Arc<Inner<T, C>>,
}

struct Inner<T, C> {
    transport: T,
    codec: C,
    config: SessionConfig,
    /// The single source of truth. Readers borrow, writers replace.
    state: watch::Sender<SessionState>,
    /// The refresh currently in flight, if any.
    refresh_flight: Mutex<Option<RefreshFlight>>,
    /// Parent of every token this manager hands out.
    root: CancellationToken,
    /// Parent of session-scoped requests. Replaced on every logout.
    scope: std::sync::Mutex<CancellationToken>,
}

impl<T: HttpTransport, C: Codec> Clone for SessionManager<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: HttpTransport> SessionManager<T, JsonCodec> {
    /// Creates a manager that speaks JSON. State starts as
    /// [`SessionState::Unknown`].
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self::with_codec(transport, JsonCodec, config)
    }
}

impl<T: HttpTransport, C: Codec> SessionManager<T, C> {
    /// Creates a manager with a custom codec.
    pub fn with_codec(transport: T, codec: C, config: SessionConfig) -> Self {
        let root = CancellationToken::new();
        let scope = root.child_token();
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            inner: Arc::new(Inner {
                transport,
                codec,
                config: config.validated(),
                state,
                refresh_flight: Mutex::new(None),
                root,
                scope: std::sync::Mutex::new(scope),
            }),
        }
    }

    // -----------------------------------------------------------------
    // State accessors
    // -----------------------------------------------------------------

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receives every state change. This is how the UI re-renders.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// The current user, if logged in.
    pub fn user(&self) -> Option<UserProfile> {
        self.inner.state.borrow().user().cloned()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// A fresh token for one session-scoped request. It is cancelled by
    /// the next `logout()` or by `shutdown()`.
    pub fn scope(&self) -> CancellationToken {
        self.current_scope().child_token()
    }

    // -----------------------------------------------------------------
    // Write paths: errors propagate to the caller
    // -----------------------------------------------------------------

    /// Logs in with email and password.
    ///
    /// # Errors
    /// Any failure (network, validation, wrong password) leaves the
    /// state `Unauthenticated` and is returned for display.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, SessionError> {
        let body = self.inner.codec.encode(&Credentials::new(email, password))?;
        self.authenticate(endpoints::LOGIN, body).await
    }

    /// Creates an account and logs in as the new user.
    ///
    /// # Errors
    /// Same contract as [`login`](Self::login).
    pub async fn signup(
        &self,
        form: &SignupForm,
    ) -> Result<UserProfile, SessionError> {
        let body = self.inner.codec.encode(form)?;
        self.authenticate(endpoints::REGISTER, body).await
    }

    /// Enrolls the current user in a course.
    ///
    /// On success the course ID is added to the held profile.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthenticated`] if nobody is logged in
    /// - anything the server or network reports
    pub async fn enroll(
        &self,
        course_id: &str,
    ) -> Result<Enrollment, SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }

        let body = self.inner.codec.encode(&EnrollRequest {
            course_id: course_id.to_string(),
        })?;
        let request = HttpRequest::post(endpoints::ENROLL).body(body);
        let response = self.fetch(request).await?;
        let envelope = self.read_envelope(&response)?;

        let enrollment = match envelope.enrollment {
            Some(e) => e,
            None => self.payload_from_data(envelope.data)?.ok_or_else(|| {
                ProtocolError::InvalidResponse("enroll response without enrollment".into())
            })?,
        };

        self.inner.state.send_if_modified(|state| match state {
            SessionState::Authenticated(user) if !user.is_enrolled_in(course_id) => {
                user.enrolled_course_ids.push(course_id.to_string());
                true
            }
            _ => false,
        });
        tracing::info!(course_id, enrollment_id = %enrollment.id, "enrolled");
        Ok(enrollment)
    }

    /// Logs out. Never fails and is safe to call repeatedly.
    ///
    /// 1. Cancels every in-flight session-scoped request.
    /// 2. Asks the server to clear the cookie (best effort).
    /// 3. Sets the state to `Unauthenticated`, whatever step 2 did.
    pub async fn logout(&self) {
        let old_scope = {
            let mut scope = self.inner.scope.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *scope, self.inner.root.child_token())
        };
        old_scope.cancel();

        let cancel = self.inner.root.child_token();
        match send_with_cancel(
            &self.inner.transport,
            HttpRequest::post(endpoints::LOGOUT),
            &cancel,
        )
        .await
        {
            Ok(res) if !res.is_success() => {
                tracing::debug!(status = res.status, "server logout rejected; clearing locally");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "server logout failed; clearing locally");
            }
        }

        self.set_state(SessionState::Unauthenticated);
    }

    // -----------------------------------------------------------------
    // Read paths: errors degrade instead of propagating
    // -----------------------------------------------------------------

    /// Checks whether the session cookie is still good.
    ///
    /// Resolves the startup `Unknown` state: a readable profile means
    /// `Authenticated`, anything else means `Unauthenticated`.
    pub async fn check_auth(&self) -> SessionState {
        let outcome: Result<UserProfile, SessionError> = async {
            let response = self.fetch(HttpRequest::get(endpoints::PROFILE)).await?;
            let envelope = self.read_envelope(&response)?;
            envelope.user.ok_or_else(|| {
                ProtocolError::InvalidResponse("profile response without user".into()).into()
            })
        }
        .await;

        match outcome {
            Ok(user) => self.set_state(SessionState::Authenticated(user)),
            Err(e) => {
                tracing::debug!(error = %e, "no valid session");
                self.set_state(SessionState::Unauthenticated);
            }
        }
        self.state()
    }

    /// The current user's enrollments; empty on any failure.
    pub async fn get_enrollments(&self) -> Vec<Enrollment> {
        let outcome: Result<Vec<Enrollment>, SessionError> = async {
            let response =
                self.fetch(HttpRequest::get(endpoints::USER_ENROLLMENTS)).await?;
            let envelope = self.read_envelope(&response)?;
            match envelope.enrollments {
                Some(list) => Ok(list),
                None => Ok(self.payload_from_data(envelope.data)?.unwrap_or_default()),
            }
        }
        .await;

        outcome.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not load enrollments");
            Vec::new()
        })
    }

    // -----------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------

    /// Silently extends the session. Returns `true` on success.
    ///
    /// On failure the manager logs out. Concurrent callers share one
    /// request and all see its result. The request runs on its own task,
    /// so it completes and frees the slot even if every caller is dropped.
    pub async fn refresh(&self) -> bool {
        let flight = {
            let mut slot = self.inner.refresh_flight.lock().await;
            match slot.as_ref() {
                Some(flight) => {
                    tracing::trace!("joining in-flight refresh");
                    flight.clone()
                }
                None => {
                    let this = self.clone();
                    // The slot lock is held until the flight is stored, so
                    // the task always clears its own flight.
                    let task = tokio::spawn(async move {
                        let ok = this.refresh_once().await;
                        this.inner.refresh_flight.lock().await.take();
                        ok
                    });
                    let flight = async move {
                        task.await.unwrap_or_else(|e| {
                            tracing::error!(error = %e, "refresh task failed");
                            false
                        })
                    }
                    .boxed()
                    .shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    async fn refresh_once(&self) -> bool {
        let scope = self.current_scope();
        let outcome = match send_with_cancel(
            &self.inner.transport,
            HttpRequest::post(endpoints::REFRESH_TOKEN),
            &scope,
        )
        .await
        {
            Ok(response) => self.read_envelope(&response),
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(envelope) => {
                if scope.is_cancelled() {
                    // Logged out while the refresh was in flight.
                    return false;
                }
                if let Some(user) = envelope.user {
                    self.set_state(SessionState::Authenticated(user));
                }
                tracing::info!("session refreshed");
                true
            }
            Err(SessionError::Transport(TransportError::Cancelled)) => {
                tracing::debug!("refresh cancelled");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "silent refresh failed; logging out");
                self.logout().await;
                false
            }
        }
    }

    /// Spawns the periodic refresh loop.
    ///
    /// The loop refreshes every `refresh_interval` while authenticated,
    /// pauses while not, and exits on [`shutdown`](Self::shutdown).
    pub fn spawn_refresh_task(&self) -> JoinHandle<()> {
        let manager = self.clone();
        let mut state_rx = self.subscribe();
        let root = self.inner.root.clone();
        let mut timer = RefreshTimer::new(
            self.inner.config.refresh_interval(),
            self.inner.config.refresh_jitter,
        );
        if state_rx.borrow_and_update().is_authenticated() {
            timer.resume();
        }

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = root.cancelled() => break,
                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if state_rx.borrow_and_update().is_authenticated() {
                            timer.resume();
                        } else {
                            timer.pause();
                        }
                    }
                    tick = timer.wait_for_tick() => {
                        if manager.is_authenticated() {
                            tracing::debug!(tick, "periodic refresh");
                            manager.refresh().await;
                        }
                    }
                }
            }
            tracing::debug!("refresh task stopped");
        })
    }

    /// Cancels every in-flight request and stops the refresh task.
    /// The state is left as is.
    pub fn shutdown(&self) {
        self.inner.root.cancel();
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    async fn authenticate(
        &self,
        path: &str,
        body: Vec<u8>,
    ) -> Result<UserProfile, SessionError> {
        let request = HttpRequest::post(path).body(body);
        let outcome: Result<UserProfile, SessionError> = async {
            let response =
                send_with_cancel(&self.inner.transport, request, &self.scope()).await?;
            let envelope = self.read_envelope(&response)?;
            envelope.user.ok_or_else(|| {
                ProtocolError::InvalidResponse(format!("{path} response without user")).into()
            })
        }
        .await;

        match outcome {
            Ok(user) => {
                tracing::info!(user_id = %user.user_id, path, "authenticated");
                self.set_state(SessionState::Authenticated(user.clone()));
                Ok(user)
            }
            Err(e) => {
                tracing::info!(error = %e, path, "authentication failed");
                self.set_state(SessionState::Unauthenticated);
                Err(e)
            }
        }
    }

    /// Turns any response into an envelope or a classified error.
    pub(crate) fn read_envelope(
        &self,
        response: &HttpResponse,
    ) -> Result<ApiResponse, SessionError> {
        if !response.is_success() {
            let envelope = self.inner.codec.decode_response(&response.body).ok();
            return Err(SessionError::from_status(response.status, envelope));
        }
        let envelope = self.inner.codec.decode_response(&response.body)?;
        if !envelope.success {
            return Err(SessionError::Rejected {
                message: envelope.message,
            });
        }
        Ok(envelope)
    }

    /// Decodes a typed payload out of the generic `data` field.
    fn payload_from_data<P: DeserializeOwned>(
        &self,
        data: Option<serde_json::Value>,
    ) -> Result<Option<P>, SessionError> {
        let Some(value) = data else {
            return Ok(None);
        };
        let payload = serde_json::from_value(value).map_err(ProtocolError::Decode)?;
        Ok(Some(payload))
    }

    pub(crate) fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub(crate) fn codec(&self) -> &C {
        &self.inner.codec
    }

    fn current_scope(&self) -> CancellationToken {
        self.inner
            .scope
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, next: SessionState) {
        let previous = self.inner.state.send_replace(next);
        let current = self.inner.state.borrow();
        if previous.label() != current.label() {
            tracing::info!(from = previous.label(), to = current.label(), "session state changed");
        }
    }
}
