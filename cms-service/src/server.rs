//! HTTP server with graceful shutdown

use axum::extract::DefaultBodyLimit;
use axum::Router;
use http::{header, HeaderName, HeaderValue, Method};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::Result,
    middleware::{
        envelope_layer_errors, panic_response, request_id_layer, request_id_propagation_layer,
        sensitive_headers_layer,
    },
};

const CORS_MAX_AGE: Duration = Duration::from_secs(300);

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the server with the given router until SIGINT/SIGTERM
    ///
    /// After the signal, in-flight requests get `shutdown_timeout_secs` to
    /// finish before the server stops waiting for them.
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = self.config.bind_address();
        tracing::info!("Starting {} on {}", self.config.service.name, addr);
        self.log_middleware_config();

        let app = self.apply_middleware(app);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
        let server = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signal_tx.send(());
        })
        .into_future();
        tokio::pin!(server);

        let grace = self.config.shutdown_timeout();
        tokio::select! {
            result = &mut server => result?,
            _ = async {
                if signal_rx.await.is_ok() {
                    tokio::time::sleep(grace).await;
                } else {
                    std::future::pending::<()>().await;
                }
            } => {
                tracing::warn!(
                    "In-flight requests still running after {:?}; shutting down anyway",
                    grace
                );
            }
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Wrap `app` in the middleware stack
    ///
    /// Each `layer` call wraps everything before it, so the list reads
    /// innermost first and `CatchPanicLayer` sees every request. Error
    /// envelopes are applied outside the timeout and body-limit layers so
    /// their 408/413 answers get the standard body.
    pub fn apply_middleware(&self, app: Router) -> Router {
        let body_limit = self.config.middleware.body_limit_bytes();

        app.layer(DefaultBodyLimit::disable())
            .layer(self.build_cors_layer())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                http::StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout(),
            ))
            .layer(RequestBodyLimitLayer::new(body_limit))
            .layer(axum::middleware::map_response(envelope_layer_errors))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            .layer(sensitive_headers_layer())
            .layer(request_id_propagation_layer())
            .layer(request_id_layer())
            .layer(CatchPanicLayer::custom(panic_response))
    }

    fn log_middleware_config(&self) {
        tracing::info!("Middleware configuration:");
        tracing::info!("  - Panic recovery: enabled");
        tracing::info!("  - Request ID tracking: enabled");
        tracing::info!("  - Sensitive header masking: enabled");
        tracing::info!(
            "  - Request body limit: {} MB",
            self.config.middleware.body_limit_mb
        );
        tracing::info!("  - Compression: enabled");
        tracing::info!(
            "  - CORS origins: {}",
            self.config.middleware.cors_allowed_origins
        );
        tracing::info!(
            "  - Request timeout: {} seconds",
            self.config.service.timeout_secs
        );
    }

    fn build_cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::ACCEPT,
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static("x-csrf-token"),
            ])
            .expose_headers([HeaderName::from_static("x-request-id")])
            .max_age(CORS_MAX_AGE);

        match self.config.middleware.allowed_origins() {
            None => layer.allow_origin(Any),
            Some(origins) => {
                let origins: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|origin| match HeaderValue::from_str(origin) {
                        Ok(value) => Some(value),
                        Err(_) => {
                            tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                            None
                        }
                    })
                    .collect();
                layer.allow_origin(AllowOrigin::list(origins))
            }
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::routing::{get, post};
    use http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn panics() -> &'static str {
        panic!("boom")
    }

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(30)).await;
        "late"
    }

    fn app(config: Config) -> Router {
        let routes = Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/echo", post(|body: String| async move { body }))
            .route("/panic", get(panics))
            .route("/slow", get(slow));
        Server::new(config).apply_middleware(routes)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_server_creation() {
        let config = Config::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().service.port, config.service.port);
    }

    #[tokio::test]
    async fn test_wildcard_cors_allows_any_origin() {
        let response = app(Config::default())
            .oneshot(preflight("https://site.example"))
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_MAX_AGE], "300");
    }

    #[tokio::test]
    async fn test_listed_origins_only() {
        let mut config = Config::default();
        config.middleware.cors_allowed_origins = "https://admin.example".into();

        let allowed = app(config.clone())
            .oneshot(preflight("https://admin.example"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://admin.example"
        );

        let denied = app(config).oneshot(preflight("https://evil.example")).await.unwrap();
        assert!(denied
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let response = app(Config::default())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_panic_is_internal_error_envelope() {
        let response = app(Config::default())
            .oneshot(Request::builder().uri("/panic").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!("INTERNAL_ERROR"));
        assert_eq!(body["error"]["message"], json!("An internal error occurred"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_payload_too_large_envelope() {
        let mut config = Config::default();
        config.middleware.body_limit_mb = 0;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .header(header::CONTENT_LENGTH, "5")
            .body(Body::from("hello"))
            .unwrap();
        let response = app(config).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], json!("PAYLOAD_TOO_LARGE"));
        assert_eq!(body["error"]["message"], json!("Request body too large"));
    }

    #[tokio::test]
    async fn test_timeout_is_request_timeout_envelope() {
        let mut config = Config::default();
        config.service.timeout_secs = 0;

        let response = app(config)
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], json!("REQUEST_TIMEOUT"));
        assert!(body.get("data").is_none());
    }
}
