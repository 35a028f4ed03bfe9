//! Service request endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use challan_common::AppResult;
use challan_core::{CreateServiceRequestInput, UpdateServiceRequestInput};
use challan_db::entities::service_request::{self, ServiceRequestStatus};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestResponse {
    pub id: String,
    pub requester_id: String,
    pub vehicle_number: String,
    pub service_type: String,
    pub description: String,
    pub preferred_date: Option<String>,
    pub status: ServiceRequestStatus,
    pub provider_id: Option<String>,
    pub scheduled_for: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<service_request::Model> for ServiceRequestResponse {
    fn from(r: service_request::Model) -> Self {
        Self {
            id: r.id,
            requester_id: r.requester_id,
            vehicle_number: r.vehicle_number,
            service_type: r.service_type,
            description: r.description,
            preferred_date: r.preferred_date.map(|d| d.to_rfc3339()),
            status: r.status,
            provider_id: r.provider_id,
            scheduled_for: r.scheduled_for.map(|d| d.to_rfc3339()),
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

fn to_responses(requests: Vec<service_request::Model>) -> Vec<ServiceRequestResponse> {
    requests.into_iter().map(Into::into).collect()
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateServiceRequestInput>,
) -> AppResult<ApiResponse<ServiceRequestResponse>> {
    let request = state.service_request_service.create(&user, req).await?;
    Ok(ApiResponse::ok(request.into()))
}

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ServiceRequestResponse>>> {
    let requests = state.service_request_service.list_for(&user).await?;
    Ok(ApiResponse::ok(to_responses(requests)))
}

async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ServiceRequestResponse>>> {
    let requests = state.service_request_service.list_mine(&user).await?;
    Ok(ApiResponse::ok(to_responses(requests)))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateServiceRequestInput>,
) -> AppResult<ApiResponse<ServiceRequestResponse>> {
    let request = state
        .service_request_service
        .update_status(&user, &id, req)
        .await?;
    Ok(ApiResponse::ok(request.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/mine", get(mine))
        .route("/{id}", patch(update))
}
