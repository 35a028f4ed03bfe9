//! Users endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use challan_common::AppResult;
use challan_db::entities::user::{self, UserRole};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Public user info.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub specialization: Option<String>,
    pub is_blacklisted: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            specialization: user.specialization,
            is_blacklisted: user.is_blacklisted,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn blacklist(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.set_blacklisted(&actor, &id, true).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn unblacklist(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state
        .user_service
        .set_blacklisted(&actor, &id, false)
        .await?;
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(show))
        .route("/{id}/blacklist", post(blacklist))
        .route("/{id}/unblacklist", post(unblacklist))
}
