//! API integration tests.
//!
//! These tests drive the router end to end with a mock database for CRUD
//! paths and an in-memory report store for the aggregate views.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn_with_state,
};
use challan_api::{AppState, auth_middleware, router as api_router};
use challan_common::{AppError, AppResult};
use challan_core::{
    ChallanService, InMemoryReportStore, LeaderboardService, ReportSnapshot, ReportStore,
    ServiceRequestService, StatsService, StoreService, UserService,
};
use challan_db::{
    entities::{
        challan::ChallanStatus,
        user::{self, UserRole},
    },
    repositories::{ChallanRepository, ServiceRequestRepository, UserRepository},
};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::Value;
use tower::ServiceExt;

fn test_user(id: &str, name: &str, role: UserRole) -> user::Model {
    user::Model {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{id}@example.com"),
        password_hash: "hash".to_string(),
        token: Some(format!("token-{id}")),
        role,
        specialization: None,
        is_blacklisted: false,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

fn report(id: &str, by: &str, status: ChallanStatus, tags: &[&str]) -> ReportSnapshot {
    ReportSnapshot {
        id: id.to_string(),
        reported_by: Some(by.to_string()),
        status: Some(status),
        tags: tags.iter().map(ToString::to_string).collect(),
    }
}

/// Build state over a mock database and a report store.
fn create_test_state(db: MockDatabase, store: StoreService) -> AppState {
    let db = Arc::new(db.into_connection());

    AppState {
        user_service: UserService::new(UserRepository::new(Arc::clone(&db))),
        challan_service: ChallanService::new(ChallanRepository::new(Arc::clone(&db))),
        service_request_service: ServiceRequestService::new(ServiceRequestRepository::new(
            Arc::clone(&db),
        )),
        stats_service: StatsService::new(Arc::clone(&store)),
        leaderboard_service: LeaderboardService::new(store),
    }
}

fn create_test_router_with(db: MockDatabase, store: StoreService) -> Router {
    let state = create_test_state(db, store);
    api_router()
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn create_test_router() -> Router {
    create_test_router_with(
        MockDatabase::new(DatabaseBackend::Postgres),
        Arc::new(InMemoryReportStore::new()),
    )
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_meta_endpoint() {
    let response = create_test_router().oneshot(get("/meta")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "challan-portal");
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let response = create_test_router()
        .oneshot(get("/nonexistent/endpoint"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leaderboard_ranks_citizens() {
    let store = InMemoryReportStore::with_data(
        vec![
            test_user("1", "A", UserRole::Citizen),
            test_user("2", "B", UserRole::Citizen),
            test_user("p1", "Officer", UserRole::Reviewer),
        ],
        vec![
            report("r1", "1", ChallanStatus::Approved, &["Speeding"]),
            report("r2", "1", ChallanStatus::Pending, &["Speeding", "NoHelmet"]),
            report("r3", "2", ChallanStatus::Rejected, &[]),
            report("r4", "p1", ChallanStatus::Approved, &[]),
        ],
    );
    let app = create_test_router_with(MockDatabase::new(DatabaseBackend::Postgres), Arc::new(store));

    let response = app.oneshot(get("/leaderboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0]["id"], "1");
    assert_eq!(entries[0]["totalReports"], 2);
    assert_eq!(entries[0]["approvedReports"], 1);
    assert_eq!(entries[0]["pendingReports"], 1);
    assert_eq!(entries[0]["topTag"], "speeding");
    assert_eq!(entries[0]["rank"], 1);
    assert!(entries[0].get("tagCounts").is_none());

    assert_eq!(entries[1]["id"], "2");
    assert_eq!(entries[1]["rejectedReports"], 1);
    assert_eq!(entries[1]["topTag"], Value::Null);
    assert_eq!(entries[1]["rank"], 2);
}

#[tokio::test]
async fn test_leaderboard_empty() {
    let response = create_test_router().oneshot(get("/leaderboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], serde_json::json!([]));
}

struct UnavailableStore;

#[async_trait]
impl ReportStore for UnavailableStore {
    async fn list_users(&self) -> AppResult<Vec<user::Model>> {
        Err(AppError::Database("connection refused".to_string()))
    }

    async fn list_reports(&self) -> AppResult<Vec<ReportSnapshot>> {
        Err(AppError::Database("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_leaderboard_store_failure_is_server_error() {
    let app = create_test_router_with(
        MockDatabase::new(DatabaseBackend::Postgres),
        Arc::new(UnavailableStore),
    );

    let response = app.oneshot(get("/leaderboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn test_stats_counts() {
    let store = InMemoryReportStore::with_data(
        vec![
            test_user("1", "A", UserRole::Citizen),
            test_user("p1", "Officer", UserRole::Reviewer),
        ],
        vec![
            report("r1", "1", ChallanStatus::Approved, &[]),
            report("r2", "1", ChallanStatus::Pending, &[]),
        ],
    );
    let app = create_test_router_with(MockDatabase::new(DatabaseBackend::Postgres), Arc::new(store));

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["totalChallans"], 2);
    assert_eq!(body["data"]["approvedChallans"], 1);
    assert_eq!(body["data"]["pendingChallans"], 1);
    assert_eq!(body["data"]["rejectedChallans"], 0);
    assert_eq!(body["data"]["totalUsers"], 1);
}

#[tokio::test]
async fn test_create_challan_requires_auth() {
    let response = create_test_router()
        .oneshot(json_request(
            "POST",
            "/challans",
            r#"{"numberPlate":"KA-01-AB-1234","imageUrl":"/uploads/a.jpg"}"#,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_challan_without_image() {
    let citizen = test_user("u1", "A", UserRole::Citizen);
    let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[citizen]]);
    let app = create_test_router_with(db, Arc::new(InMemoryReportStore::new()));

    let response = app
        .oneshot(json_request(
            "POST",
            "/challans",
            r#"{"numberPlate":"KA-01-AB-1234","tags":"Speeding"}"#,
            Some("token-u1"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Bad request: Image is required");
}

#[tokio::test]
async fn test_citizen_cannot_review() {
    let citizen = test_user("u1", "A", UserRole::Citizen);
    let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[citizen]]);
    let app = create_test_router_with(db, Arc::new(InMemoryReportStore::new()));

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/challans/c1",
            r#"{"status":"approved"}"#,
            Some("token-u1"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_challans_unknown_status() {
    let response = create_test_router()
        .oneshot(get("/challans?status=archived"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_router_with(db, Arc::new(InMemoryReportStore::new()));

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            r#"{"email":"nobody@example.com","password":"secret123"}"#,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_with_invalid_json_returns_error() {
    let response = create_test_router()
        .oneshot(json_request("POST", "/auth/register", "invalid json", None))
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let existing = test_user("u1", "A", UserRole::Citizen);
    let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]);
    let app = create_test_router_with(db, Arc::new(InMemoryReportStore::new()));

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            r#"{"name":"A","email":"u1@example.com","password":"secret123"}"#,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_service_requests_require_auth() {
    let response = create_test_router()
        .oneshot(get("/service-requests/mine"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
