//! Auth Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are rendered by the
//! auth crate.

mod config;

use std::sync::Arc;
use std::time::Duration;

use auth::{AuthService, LogResetNotifier, PgAuthRepository, auth_routes};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use platform::rate_limit::SlidingWindowLimiter;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_server=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let limiter = Arc::new(SlidingWindowLimiter::new());
    let notifier = Arc::new(LogResetNotifier::new(config.reset_link_prefix()));
    let service = AuthService::new(
        Arc::new(PgAuthRepository::new(pool.clone())),
        limiter.clone(),
        notifier,
        config.auth.clone(),
    )?;

    // Startup cleanup: errors here should not prevent server startup
    match service.cleanup_expired().await {
        Ok(report) => {
            tracing::info!(
                sessions_deleted = report.sessions,
                reset_tokens_deleted = report.reset_tokens,
                "Auth cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Auth cleanup failed, continuing anyway"
            );
        }
    }

    spawn_cleanup(service.clone(), limiter, config.cleanup_interval);

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes(service))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = config.bind_addr;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Periodically drop expired sessions and reset tokens, and idle limiter keys
fn spawn_cleanup(
    service: AuthService<PgAuthRepository>,
    limiter: Arc<SlidingWindowLimiter>,
    every: Duration,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick fires immediately; startup cleanup already ran
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match service.cleanup_expired().await {
                Ok(report) => {
                    tracing::debug!(
                        sessions_deleted = report.sessions,
                        reset_tokens_deleted = report.reset_tokens,
                        "Periodic auth cleanup"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Periodic auth cleanup failed");
                }
            }

            let purged = limiter.purge_idle();
            if purged > 0 {
                tracing::debug!(keys_purged = purged, "Rate limiter keys purged");
            }
        }
    });
}
