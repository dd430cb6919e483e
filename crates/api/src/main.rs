//! Arthub API
//!
//! The HTTP entry point for the Arthub art marketplace.
//! Handles:
//! - Authentication (JWT bearer tokens)
//! - Marketplace: artists, artworks, orders, reviews
//! - Community: connections, posts, comments
//! - Analytics events and notifications
//! - Rate limiting and observability (logging, metrics, tracing)

mod handlers;
mod middleware;

#[cfg(test)]
mod tests;

use arthub_common::{
    auth::JwtManager,
    config::{AppConfig, ObservabilityConfig},
    db::{schema, DbPool},
    errors::{AppError, Result},
    metrics::{self, LATENCY_BUCKETS},
};
use axum::{extract::FromRef, middleware::from_fn, middleware::from_fn_with_state, routing::get, Router};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    /// Build the state; a missing JWT secret is a configuration error
    pub fn new(config: AppConfig, db: DbPool) -> Result<Self> {
        let secret = config
            .auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Configuration {
                message: "auth.jwt_secret must be set (APP__AUTH__JWT_SECRET)".to_string(),
            })?;

        let jwt = Arc::new(JwtManager::new(secret, config.auth.jwt_expiration_secs));

        Ok(Self {
            config: Arc::new(config),
            db,
            jwt,
        })
    }
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    init_tracing(&config.observability);

    info!("Starting Arthub API v{}", arthub_common::VERSION);

    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                LATENCY_BUCKETS,
            )?
            .with_http_listener(addr)
            .install()?;
        info!(%addr, "Prometheus exporter listening");
    }
    metrics::register_metrics();

    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    if config.database.auto_migrate {
        schema::sync(db.write()).await?;
        info!("Database schema is up to date");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let shutdown_timeout = config.shutdown_timeout();

    let state = AppState::new(config, db)?;
    let app = create_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    tokio::select! {
        result = server => result?,
        _ = drain_deadline(shutdown_timeout) => {
            warn!("Shutdown timeout elapsed with requests still in flight");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/auth", handlers::auth::routes())
        .nest("/artists", handlers::artists::routes())
        .nest("/artworks", handlers::artworks::routes())
        .nest("/orders", handlers::orders::routes())
        .nest("/reviews", handlers::reviews::routes())
        .nest("/community", handlers::community::routes())
        .nest("/analytics", handlers::analytics::routes())
        .nest("/notifications", handlers::notifications::routes());

    let mut router = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .layer(from_fn(middleware::metrics::track_metrics));

    match middleware::rate_limit::RateLimitState::from_config(&state.config.rate_limit) {
        Some(limiter) => {
            router = router.layer(from_fn_with_state(limiter, middleware::rate_limit::rate_limit));
        }
        None => warn!("Rate limiting disabled"),
    }

    let timeout = state.config.request_timeout();

    router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors)
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

/// Resolves `timeout` after a shutdown signal, bounding the connection drain
async fn drain_deadline(timeout: std::time::Duration) {
    shutdown_signal().await;
    tokio::time::sleep(timeout).await;
}
