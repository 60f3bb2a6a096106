//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing)
//! - Build the shared fetcher and archive streamer once
//! - Serve until shutdown, then drain for a bounded grace period

use std::future::IntoFuture;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, Request},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::archive::ArchiveStreamer;
use crate::config::{ArchiveConfig, ServiceConfig};
use crate::fetch::{FetchError, Fetcher};
use crate::http::zip::{zip_from_body, zip_from_query};

const X_REQUEST_ID: &str = "x-request-id";

/// Errors that stop the service from starting or serving.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The shared download client could not be built.
    #[error("failed to build fetch client: {0}")]
    Client(#[from] FetchError),

    /// The listen address could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Accepting or serving connections failed.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind the listener the server will accept on.
pub async fn bind(address: &str) -> Result<TcpListener, ServiceError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| ServiceError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub streamer: ArchiveStreamer,
    pub archive: ArchiveConfig,
}

/// HTTP server for the zip service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let fetcher = Fetcher::new(&config.fetch)?;
        let streamer = ArchiveStreamer::new(fetcher, config.archive.compression)
            .with_spool_limit(config.archive.spool_memory_limit);
        let state = AppState {
            streamer,
            archive: config.archive.clone(),
        };

        let router = Self::build_router(state, config.listener.max_body_bytes);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, max_body_bytes: usize) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .route("/zip", get(zip_from_query).post(zip_from_body))
            .route("/health", get(health))
            .with_state(state)
            .layer(DefaultBodyLimit::max(max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            let request_id = request
                                .headers()
                                .get(X_REQUEST_ID)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("unknown");
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id,
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::new(request_id)),
            )
    }

    /// The router, for serving it elsewhere or calling it directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Once `shutdown` fires the listener stops accepting and in-flight
    /// archives get `shutdown.grace_period_secs` to finish. Connections still
    /// open after that are abandoned.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServiceError> {
        let addr = listener.local_addr().map_err(ServiceError::Serve)?;
        let grace = Duration::from_secs(self.config.shutdown.grace_period_secs);
        tracing::info!(address = %addr, "HTTP server starting");

        let (draining_tx, draining_rx) = oneshot::channel::<()>();
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
                let _ = draining_tx.send(());
            })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => result.map_err(ServiceError::Serve)?,
            Ok(()) = draining_rx => {
                match tokio::time::timeout(grace, &mut serve).await {
                    Ok(result) => result.map_err(ServiceError::Serve)?,
                    Err(_) => tracing::warn!(
                        grace_period_secs = grace.as_secs(),
                        "Grace period elapsed, dropping remaining connections"
                    ),
                }
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        HttpServer::new(ServiceConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn health_route_sets_request_id() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn invalid_list_rejected_before_streaming() {
        let request = Request::builder()
            .method("POST")
            .uri("/zip")
            .body(Body::from(r#"[{"url":"http://localhost/test","filename":""}]"#))
            .unwrap();
        let response = server().router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: crate::http::ErrorResponseBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body.error.message,
            "invalid data at index 0: file name cannot be empty"
        );
    }

    #[tokio::test]
    async fn first_files_parameter_is_used() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/zip?files=%5B%5D&files=%5B%5D")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/zip");
    }

    #[tokio::test]
    async fn undecodable_query_gets_json_error() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/zip?files=%ZZ").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(serde_json::from_slice::<crate::http::ErrorResponseBody>(&bytes).is_ok());
    }

    #[tokio::test]
    async fn oversized_body_gets_json_error() {
        let mut config = ServiceConfig::default();
        config.listener.max_body_bytes = 1024;
        let server = HttpServer::new(config).unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/zip")
            .body(Body::from(vec![b' '; 4096]))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: crate::http::ErrorResponseBody = serde_json::from_slice(&bytes).unwrap();
        assert!(body.error.message.contains("length limit exceeded"));
    }

    #[tokio::test]
    async fn bind_failure_names_the_address() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = taken.local_addr().unwrap().to_string();

        let err = bind(&address).await.unwrap_err();
        assert!(matches!(err, ServiceError::Bind { address: ref a, .. } if *a == address));
        assert!(err.to_string().contains(&address));
    }
}
