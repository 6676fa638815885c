//! Safety Monitor API Server
//!
//! REST surface for the monitoring console and traveler clients: telemetry
//! ingestion, alert polling and resolution, panic dispatch, group and
//! incident management.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;
mod error;
mod ident;
mod routes;

pub use config::{AppConfig, DatabaseConfig, ServerConfig};
pub use error::ApiError;

use alerting::{PanicRouter, ResolutionLinker};
use storage::Repository;

/// Application state shared across handlers
pub struct AppState {
    /// Storage repository
    pub repository: Repository,
    /// Panic fan-out router
    pub panic_router: PanicRouter,
    /// Resolution linker
    pub linker: ResolutionLinker,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state over a connected repository
    pub fn new(repository: Repository) -> Self {
        Self {
            panic_router: PanicRouter::new(repository.clone()),
            linker: ResolutionLinker::new(repository.clone()),
            repository,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub metrics: StoreMetrics,
}

/// Store counters reported by the health endpoint
#[derive(Debug, Serialize)]
pub struct StoreMetrics {
    pub travelers: i64,
    pub samples: i64,
    pub unresolved_alerts: i64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route(
            "/api/v1/travelers",
            post(routes::travelers::register).get(routes::travelers::list),
        )
        .route("/api/v1/travelers/:id", get(routes::travelers::details))
        .route(
            "/api/v1/telemetry",
            post(routes::telemetry::report).get(routes::telemetry::list),
        )
        .route(
            "/api/v1/alerts",
            get(routes::alerts::console_feed).delete(routes::alerts::clear),
        )
        .route("/api/v1/alerts/panic", post(routes::alerts::panic))
        .route("/api/v1/alerts/traveler/:id", get(routes::alerts::traveler_feed))
        .route("/api/v1/alerts/:id/resolve", post(routes::alerts::resolve))
        .route("/api/v1/groups", post(routes::groups::create))
        .route("/api/v1/groups/join", post(routes::groups::join))
        .route("/api/v1/groups/leave", post(routes::groups::leave))
        .route("/api/v1/groups/mine/:id", get(routes::groups::mine))
        .route("/api/v1/groups/locations/:id", get(routes::groups::locations))
        .route(
            "/api/v1/incidents",
            post(routes::incidents::create).get(routes::incidents::list),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        metrics: StoreMetrics {
            travelers: state.repository.traveler_count().await?,
            samples: state.repository.sample_count().await?,
            unresolved_alerts: state.repository.unresolved_count().await?,
        },
    };

    Ok(Json(response))
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server until a shutdown signal arrives
pub async fn run_server(addr: &str, repository: Repository) -> std::io::Result<()> {
    let state = Arc::new(AppState::new(repository));
    let app = create_router(state);

    info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        return;
    }
    info!("shutdown signal received");
}
