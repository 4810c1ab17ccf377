//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the probes, `/env` and the static file fallback
//! - Wire up middleware (security headers, compression, timeout, request ID, tracing)
//! - Bind server to listener
//! - Stop on the shutdown signal, letting in-flight requests finish
//!
//! # Layer Order (outermost first)
//! ```text
//! SetRequestId → PropagateRequestId → Trace → Timeout → Compression
//!     → /health, /ready
//!     → /env:      SecurityHeaders → Cors → env handler
//!     → fallback:  SecurityHeaders → file handler
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, ConfigError, ServeConfig};
use crate::files::BufferPool;
use crate::http::env::{env_router, EnvKeys};
use crate::http::handler::{serve_handler, FileState};
use crate::http::health::{health, ready};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::shutdown::wait_for;
use crate::lifecycle::Shutdown;
use crate::security::{security_headers_middleware, SecurityHeaders};

/// HTTP server for static assets.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// `serve` is built separately so callers decide how it is validated;
    /// `shutdown` backs the readiness probe.
    pub fn new(
        config: &AppConfig,
        serve: ServeConfig,
        shutdown: Shutdown,
    ) -> Result<Self, ConfigError> {
        let security = Arc::new(SecurityHeaders::from_config(&config.security)?);
        let buffers = BufferPool::new(config.files.buffer_size, config.files.buffer_pool_size);
        let files = Arc::new(FileState::new(serve, buffers));

        let router = Self::build_router(config, files, security, shutdown);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &AppConfig,
        files: Arc<FileState>,
        security: Arc<SecurityHeaders>,
        shutdown: Shutdown,
    ) -> Router {
        let static_files = Router::new()
            .fallback(serve_handler)
            .with_state(files)
            .layer(middleware::from_fn_with_state(
                Arc::clone(&security),
                security_headers_middleware,
            ));

        let mut router = Router::new()
            .route("/health", get(health))
            .route("/ready", get(ready))
            .with_state(shutdown);

        let keys = EnvKeys::new(&config.env.keys);
        if !keys.is_empty() {
            tracing::info!(keys = ?config.env.keys, "Env endpoint enabled");
            router = router.merge(env_router(keys, &config.cors).layer(
                middleware::from_fn_with_state(security, security_headers_middleware),
            ));
        }

        let mut router = router.fallback_service(static_files);

        if config.compression.gzip {
            router = router.layer(CompressionLayer::new().gzip(true));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        request_id = %request_id(request),
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }),
            )
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for embedding or in-process tests.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
