//! Stats endpoint.

use axum::{Router, extract::State, routing::get};
use challan_common::AppResult;
use challan_core::PortalStats;

use crate::{middleware::AppState, response::ApiResponse};

async fn stats(State(state): State<AppState>) -> AppResult<ApiResponse<PortalStats>> {
    Ok(ApiResponse::ok(state.stats_service.compute().await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(stats))
}
