//! Meta endpoints.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::middleware::AppState;

/// Server metadata response.
#[derive(Serialize)]
pub struct MetaResponse {
    pub name: String,
    pub version: String,
}

async fn meta() -> Json<MetaResponse> {
    Json(MetaResponse {
        name: "challan-portal".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(meta))
}
