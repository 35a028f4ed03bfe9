//! Challan endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
};
use challan_common::AppResult;
use challan_core::CreateChallanInput;
use challan_db::entities::challan::{self, ChallanStatus};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{self, ApiResponse},
};

/// Challan response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallanResponse {
    pub id: String,
    pub number_plate: String,
    pub description: String,
    pub image_url: String,
    pub location: serde_json::Value,
    pub reported_by: Option<String>,
    pub reporter_name: Option<String>,
    pub tags: Vec<String>,
    pub status: ChallanStatus,
    pub reviewed_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<challan::Model> for ChallanResponse {
    fn from(c: challan::Model) -> Self {
        let tags = c.tag_list();
        Self {
            id: c.id,
            number_plate: c.number_plate,
            description: c.description,
            image_url: c.image_url,
            location: c.location,
            reported_by: c.reported_by,
            reporter_name: c.reporter_name,
            tags,
            status: c.status,
            reviewed_by: c.reviewed_by,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

fn to_responses(challans: Vec<challan::Model>) -> Vec<ChallanResponse> {
    challans.into_iter().map(ChallanResponse::from).collect()
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<ChallanResponse>>> {
    let challans = state
        .challan_service
        .list(query.status.as_deref())
        .await?;
    Ok(ApiResponse::ok(to_responses(challans)))
}

async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ChallanResponse>>> {
    let challans = state.challan_service.list_by_user(&user_id).await?;
    Ok(ApiResponse::ok(to_responses(challans)))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateChallanInput>,
) -> AppResult<ApiResponse<ChallanResponse>> {
    let challan = state.challan_service.create(&user, req).await?;
    Ok(ApiResponse::ok(challan.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<ChallanResponse>> {
    let challan = state
        .challan_service
        .update_status(&user, &id, &req.status)
        .await?;
    Ok(ApiResponse::ok(challan.into()))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.challan_service.delete(&user, &id).await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/user/{user_id}", get(list_by_user))
        .route("/{id}", patch(update_status).delete(delete))
}
