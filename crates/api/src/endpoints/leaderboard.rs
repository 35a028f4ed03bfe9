//! Leaderboard endpoint.

use axum::{Router, extract::State, routing::get};
use challan_common::AppResult;
use challan_core::LeaderboardEntry;

use crate::{middleware::AppState, response::ApiResponse};

/// Rank citizens by submitted reports.
async fn leaderboard(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<LeaderboardEntry>>> {
    let entries = state.leaderboard_service.compute().await?;
    Ok(ApiResponse::ok(entries))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(leaderboard))
}
