//! `RoundkeepServer` builder and serve loop.
//!
//! This ties the layers together: one `SessionStore` behind one lock,
//! shared by the axum router and the stale-game reaper.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use roundkeep_protocol::{Codec, JsonCodec};
use roundkeep_reaper::{ReaperConfig, StaleSessionReaper};
use roundkeep_session::{SessionStore, StoreConfig};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::handler;
use crate::{RoundkeepError, ServerConfig};

/// Shared server state passed to every handler.
///
/// The store sits behind a single `Mutex`: every operation on every game
/// is serialized through it. The reaper holds a clone of the same `Arc`.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) store: Arc<Mutex<SessionStore>>,
    pub(crate) codec: C,
}

/// Builds the HTTP routes over `state`.
pub(crate) fn router<C: Codec>(state: Arc<ServerState<C>>) -> Router {
    Router::new()
        .route("/createGame", get(handler::create_game::<C>))
        .route("/:gameid/init", post(handler::init_layout::<C>))
        .route(
            "/:gameid/updateState/:player_id/:round_id",
            post(handler::update_state::<C>),
        )
        .route("/:gameid/clear", get(handler::clear::<C>))
        .with_state(state)
}

/// Builder for configuring and starting a Roundkeep server.
///
/// # Example
///
/// ```rust,ignore
/// let server = RoundkeepServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct RoundkeepServerBuilder {
    bind_addr: String,
    store_config: StoreConfig,
    reaper_config: ReaperConfig,
}

impl RoundkeepServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            store_config: StoreConfig::default(),
            reaper_config: ReaperConfig::default(),
        }
    }

    /// Creates a builder from environment-derived settings.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new()
            .bind(&config.bind_addr())
            .store_config(config.store_config())
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session store configuration.
    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    /// Sets the reaper configuration.
    pub fn reaper_config(mut self, config: ReaperConfig) -> Self {
        self.reaper_config = config;
        self
    }

    /// Binds the listener and builds the server with `JsonCodec`.
    ///
    /// # Errors
    /// Returns [`RoundkeepError::Io`] if the address can't be bound.
    pub async fn build(self) -> Result<RoundkeepServer<JsonCodec>, RoundkeepError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            store: Arc::new(Mutex::new(SessionStore::new(self.store_config))),
            codec: JsonCodec,
        });

        Ok(RoundkeepServer {
            listener,
            state,
            reaper_config: self.reaper_config,
        })
    }
}

impl Default for RoundkeepServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Roundkeep server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct RoundkeepServer<C: Codec> {
    listener: TcpListener,
    state: Arc<ServerState<C>>,
    reaper_config: ReaperConfig,
}

impl RoundkeepServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> RoundkeepServerBuilder {
        RoundkeepServerBuilder::new()
    }
}

impl<C: Codec> RoundkeepServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// The HTTP routes, without a listener. Lets tests drive requests
    /// directly.
    pub fn router(&self) -> Router {
        router(Arc::clone(&self.state))
    }

    /// The shared store, for inspection.
    pub fn store(&self) -> Arc<Mutex<SessionStore>> {
        Arc::clone(&self.state.store)
    }

    /// Serves until Ctrl-C.
    pub async fn run(self) -> Result<(), RoundkeepError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serves until `shutdown` resolves, then stops the reaper.
    ///
    /// The reaper is started here and shares the handlers' store lock.
    pub async fn run_until(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RoundkeepError> {
        let reaper =
            StaleSessionReaper::new(Arc::clone(&self.state.store), self.reaper_config)
                .spawn();

        tracing::info!(addr = ?self.listener.local_addr().ok(), "Roundkeep server running");

        let app = router(Arc::clone(&self.state));
        let served = axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        reaper.shutdown().await;
        tracing::info!("Roundkeep server stopped");
        served.map_err(RoundkeepError::Io)
    }
}
