//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all route
//! - Wire up middleware (timeout, body limit, request ID, tracing)
//! - Dispatch every request through the route trie
//! - Translate dispatch outcomes into 404 / 405 responses
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    response::Response,
    routing::any,
    Router as AxumRouter,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::config::AppConfig;
use crate::http::handler::Handler;
use crate::http::request::{MakeRequestUuid, RequestContext, X_REQUEST_ID};
use crate::http::response;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::routing::{router::allow_header, Dispatch, Router};

/// State injected into the catch-all handler.
#[derive(Clone)]
pub struct ServerState {
    pub router: Arc<Router<Handler>>,
    pub max_body_size: usize,
}

/// HTTP server for the paragliding API.
pub struct HttpServer {
    app: AxumRouter,
}

impl HttpServer {
    pub fn new(config: AppConfig, router: Router<Handler>) -> Self {
        let state = ServerState {
            router: Arc::new(router),
            max_body_size: config.security.max_body_size,
        };
        Self {
            app: Self::build_router(&config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: ServerState) -> AxumRouter {
        AxumRouter::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The service, for in-process use.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    /// Serve on `listener` until a signal arrives or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the request through the route trie and run the bound handler.
async fn dispatch_handler(State(state): State<ServerState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (handler, pattern, params) = match state.router.dispatch(&method, &path) {
        Dispatch::Matched {
            handler,
            pattern,
            params,
        } => (Arc::clone(handler), pattern.to_string(), params),
        Dispatch::MethodNotAllowed { allowed } => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "Method not allowed");
            let mut response = response::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
            if let Ok(value) = HeaderValue::from_str(&allow_header(&allowed)) {
                response.headers_mut().insert(header::ALLOW, value);
            }
            metrics::record_request(method.as_str(), "none", 405, start);
            return response;
        }
        Dispatch::NotFound => {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
            metrics::record_request(method.as_str(), "none", 404, start);
            return response::error(StatusCode::NOT_FOUND, "Not found");
        }
    };

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body rejected");
            metrics::record_request(method.as_str(), &pattern, 413, start);
            return response::error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
    };

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        route = %pattern,
    );
    let ctx = RequestContext::new(parts, body, params);
    let response = handler(ctx).instrument(span).await;

    let status = response.status().as_u16();
    tracing::debug!(
        request_id = %request_id,
        route = %pattern,
        status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request handled"
    );
    metrics::record_request(method.as_str(), &pattern, status, start);
    response
}
