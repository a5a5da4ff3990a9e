//! HTTP front end for the federated search service.
//!
//! ## Endpoints
//!
//! - `POST /v1/search` federated search
//! - `GET /health` liveness

use crate::api::{ErrorBody, ErrorReply, HealthReply, INVALID_ARGUMENT, SearchRequest};
use crate::config::ServerConfig;
use crate::error::{ProxyError, Result};
use crate::service::SearchService;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Build the router for `service`.
pub fn router(service: SearchService) -> Router {
    Router::new()
        .route("/v1/search", post(handle_search))
        .route("/health", get(handle_health))
        .with_state(service)
}

/// Search HTTP server running in a background task.
pub struct SearchServer {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Stops accepting and drains in-flight requests when cancelled.
    shutdown: CancellationToken,
    /// Handle to the background server task.
    handle: JoinHandle<()>,
}

impl SearchServer {
    /// Start the search HTTP server.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign)
    /// and begins serving in a background tokio task. Cancelling `shutdown`
    /// stops the listener gracefully and cancels in-flight searches.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(service: SearchService, config: &ServerConfig, shutdown: CancellationToken) -> Result<Self> {
        let app = router(service);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ProxyError::Server(format!("bind {bind_addr} failed: {e}")))?;

        let addr = listener
            .local_addr()
            .map_err(|e| ProxyError::Server(format!("failed to get local addr: {e}")))?;

        info!(%addr, "search proxy listening");

        let graceful = shutdown.clone();
        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    graceful.cancelled().await;
                    info!("search proxy shutting down");
                })
                .await;
            if let Err(e) = served {
                tracing::error!("search proxy server error: {e}");
            }
        });

        Ok(Self { addr, shutdown, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Begin graceful shutdown.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait for the server task to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Server`] if the server task panicked.
    pub async fn wait(mut self) -> Result<()> {
        (&mut self.handle)
            .await
            .map_err(|e| ProxyError::Server(format!("server task failed: {e}")))
    }
}

impl Drop for SearchServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C"),
        () = terminate => info!("received SIGTERM"),
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `POST /v1/search`
async fn handle_search(
    State(service): State<SearchService>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("search body rejected: {rejection}");
            let reply = ErrorReply {
                error: ErrorBody {
                    message: rejection.body_text(),
                    error_type: INVALID_ARGUMENT.to_owned(),
                },
            };
            return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
        }
    };

    match service.search(request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            let status = if e.is_client_error() {
                tracing::debug!("search rejected: {e}");
                StatusCode::BAD_REQUEST
            } else {
                tracing::error!("search failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(ErrorReply::from_federation(&e))).into_response()
        }
    }
}

/// `GET /health`
async fn handle_health(State(service): State<SearchService>) -> Json<HealthReply> {
    Json(service.health())
}
