//! Router assembly and server lifecycle.

use crate::config::{CorsConfig, GradingConfig, StoreBackend};
use crate::handlers;
use crate::services::{MemoryStore, MongoDb, Store};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::{delete, get, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state. Handlers resolve every request against `store`.
#[derive(Clone)]
pub struct AppState {
    pub config: GradingConfig,
    pub store: Arc<dyn Store>,
}

/// Opens the backend selected by `config.store.backend`.
pub async fn open_store(config: &GradingConfig) -> Result<Arc<dyn Store>, AppError> {
    match config.store.backend {
        StoreBackend::MongoDb => {
            let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;
            db.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; records will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.allowed_origins.iter().filter_map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| tracing::error!("Ignoring invalid CORS origin '{}': {}", o, e))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/students",
            get(handlers::list_students).post(handlers::upsert_student),
        )
        .route(
            "/students/:rollNo",
            put(handlers::update_student).delete(handlers::delete_student),
        )
        .route(
            "/subjects",
            get(handlers::list_subjects).post(handlers::create_subject),
        )
        .route("/subjects/:name", delete(handlers::delete_subject))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors)
}

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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Opens the store and binds the listener (port 0 picks a free port).
    pub async fn build(config: GradingConfig) -> Result<Self, AppError> {
        let store = open_store(&config).await?;

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Server running on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState { config, store },
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.state.store.clone()
    }

    /// Serves until SIGINT/SIGTERM, then closes the store.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(shutdown_signal()).await
    }

    /// Serves until `signal` resolves. In-flight requests finish before the store closes.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let store = self.state.store.clone();
        let app = build_router(self.state);

        let result = axum::serve(self.listener, app)
            .with_graceful_shutdown(signal)
            .await;

        store.shutdown().await;

        if let Err(e) = &result {
            tracing::error!("HTTP server error: {}", e);
        }
        result
    }
}
