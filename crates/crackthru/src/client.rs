//! `CrackthruClient` builder and lifecycle.
//!
//! Ties the layers together: a cookie-keeping HTTP transport, the
//! session manager with its background refresh loop, and the route
//! prefetcher.

use crackthru_prefetch::{
    ChunkLoader, PrefetchConfig, PrefetchLink, RoutePrefetcher, RouteTable,
};
use crackthru_session::{SessionManager, SessionState};
use crackthru_transport::{HttpTransport, ReqwestTransport};
use tokio::task::JoinHandle;

use crate::{ClientConfig, CrackthruError};

/// Builder for a [`CrackthruClient`].
///
/// # Example
///
/// ```rust,ignore
/// use crackthru::prelude::*;
///
/// let client = CrackthruClientBuilder::new()
///     .config(ClientConfig::from_env()?)
///     .build(my_chunk_loader)
///     .await?;
///
/// if client.session().is_authenticated() { /* show dashboard */ }
/// ```
pub struct CrackthruClientBuilder {
    config: ClientConfig,
    routes: RouteTable,
    prefetch: PrefetchConfig,
}

impl CrackthruClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            routes: RouteTable::site(),
            prefetch: PrefetchConfig::default(),
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default site route table.
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn prefetch_config(mut self, config: PrefetchConfig) -> Self {
        self.prefetch = config;
        self
    }

    /// Builds the client over a `reqwest` transport and resolves the
    /// initial session state.
    ///
    /// # Errors
    /// Fails only if the HTTP client can't be constructed. An
    /// unreachable API just leaves the session `Unauthenticated`.
    pub async fn build<L: ChunkLoader>(
        self,
        loader: L,
    ) -> Result<CrackthruClient<ReqwestTransport, L>, CrackthruError> {
        let transport = ReqwestTransport::new(self.config.transport.clone())?;
        Ok(self.build_with_transport(transport, loader).await)
    }

    /// Builds the client over any transport. Must run inside a Tokio
    /// runtime (the refresh loop is spawned here).
    pub async fn build_with_transport<T: HttpTransport, L: ChunkLoader>(
        self,
        transport: T,
        loader: L,
    ) -> CrackthruClient<T, L> {
        let session = SessionManager::new(transport, self.config.session.clone());
        let refresh_task = session.spawn_refresh_task();
        let state = session.check_auth().await;
        tracing::info!(
            api_url = %self.config.transport.base_url,
            session = state.label(),
            "client started"
        );

        CrackthruClient {
            prefetcher: RoutePrefetcher::new(loader, self.routes, self.prefetch),
            config: self.config,
            session,
            refresh_task,
        }
    }
}

impl Default for CrackthruClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running client: session plus prefetcher.
pub struct CrackthruClient<T: HttpTransport, L: ChunkLoader> {
    config: ClientConfig,
    session: SessionManager<T>,
    prefetcher: RoutePrefetcher<L>,
    refresh_task: JoinHandle<()>,
}

impl<T: HttpTransport, L: ChunkLoader> CrackthruClient<T, L> {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager<T> {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn prefetcher(&self) -> &RoutePrefetcher<L> {
        &self.prefetcher
    }

    /// A link to `href` that prefetches through this client.
    pub fn link(&self, href: impl Into<String>) -> PrefetchLink<L> {
        PrefetchLink::new(self.prefetcher.clone(), href)
    }

    /// Cancels in-flight requests and waits for the refresh loop to
    /// stop. The session cookie is left alone; call `logout` first to
    /// end the session.
    pub async fn shutdown(self) {
        self.session.shutdown();
        if let Err(e) = self.refresh_task.await {
            tracing::warn!(error = %e, "refresh task did not stop cleanly");
        }
        tracing::info!("client stopped");
    }
}
