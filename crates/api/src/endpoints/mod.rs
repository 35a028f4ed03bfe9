//! API endpoints.

mod auth;
mod challans;
mod leaderboard;
mod meta;
mod service_requests;
mod stats;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/challans", challans::router())
        .nest("/service-requests", service_requests::router())
        .nest("/users", users::router())
        .nest("/stats", stats::router())
        .nest("/leaderboard", leaderboard::router())
        .nest("/meta", meta::router())
}
