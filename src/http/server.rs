//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the dispatcher as its only handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Collect the body up to the configured limit (413 past it, 400 on read errors)
//! - Run the synchronous dispatcher on the blocking pool
//! - Bind to a listener and shut down gracefully on Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::{DispatchRequest, MakeRequestUuid, X_REQUEST_ID};
use crate::mvc::{Dispatcher, MvcApp};

/// Application state injected into the handler.
#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    body_limit: usize,
}

/// HTTP host for an `MvcApp`.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(app: &MvcApp) -> Self {
        let config = app.config().server.clone();
        let state = AppState {
            dispatcher: app.dispatcher().clone(),
            body_limit: config.body_limit_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Hands every request to the dispatcher.
///
/// Dispatch is synchronous and may block (template files, controller
/// factories), so it runs on the blocking pool.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request = match DispatchRequest::from_http(request, state.body_limit).await {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return (e.status(), e.to_string()).into_response();
        }
    };

    let span = tracing::Span::current();
    let dispatcher = state.dispatcher.clone();
    let dispatched = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        dispatcher.handle(&request, Response::default())
    })
    .await;

    match dispatched {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
