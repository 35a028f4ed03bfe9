//! Challan portal server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{Router, http::HeaderValue, middleware};
use challan_api::{AppState, auth_middleware, router as api_router};
use challan_common::Config;
use challan_core::{
    ChallanService, DbReportStore, LeaderboardService, ServiceRequestService, StatsService,
    StoreService, UserService,
};
use challan_db::repositories::{ChallanRepository, ServiceRequestRepository, UserRepository};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// CORS for the web client: a single configured origin, or any.
fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origin = match config.server.allowed_origin.as_deref() {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid allowed_origin: {origin}"))?,
        ),
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "challan=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting challan portal server...");

    let config = Config::load().context("Failed to load configuration")?;

    let db = challan_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    challan_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let challan_repo = ChallanRepository::new(Arc::clone(&db));
    let service_request_repo = ServiceRequestRepository::new(Arc::clone(&db));

    // Aggregate views read through the store
    let store: StoreService = Arc::new(DbReportStore::new(user_repo.clone(), challan_repo.clone()));

    let state = AppState {
        user_service: UserService::new(user_repo),
        challan_service: ChallanService::new(challan_repo),
        service_request_service: ServiceRequestService::new(service_request_repo),
        stats_service: StatsService::new(Arc::clone(&store)),
        leaderboard_service: LeaderboardService::new(store),
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?)
        .with_state(state);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid server host: {}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
