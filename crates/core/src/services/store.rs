//! Read-side store abstraction for aggregate views.
//!
//! The leaderboard and the portal statistics are derived from complete
//! snapshots of users and reports. They read through [`ReportStore`] so the
//! aggregation code never touches a concrete persistence layer.

use std::sync::Arc;

use async_trait::async_trait;
use challan_common::AppResult;
use challan_db::{
    entities::{challan, challan::ChallanStatus, user},
    repositories::{ChallanRepository, UserRepository},
};
use tokio::sync::RwLock;

/// The part of a report that aggregations consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSnapshot {
    pub id: String,
    /// Submitting user; `None` for orphaned reports.
    pub reported_by: Option<String>,
    /// `None` for records whose status could not be read.
    pub status: Option<ChallanStatus>,
    pub tags: Vec<String>,
}

impl From<challan::Model> for ReportSnapshot {
    fn from(model: challan::Model) -> Self {
        let tags = model.tag_list();
        Self {
            id: model.id,
            reported_by: model.reported_by,
            status: Some(model.status),
            tags,
        }
    }
}

/// Snapshot reads over users and reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Every registered user, in load order.
    async fn list_users(&self) -> AppResult<Vec<user::Model>>;

    /// Every report, in submission order.
    async fn list_reports(&self) -> AppResult<Vec<ReportSnapshot>>;
}

/// Shared handle to a report store.
pub type StoreService = Arc<dyn ReportStore>;

/// Store backed by the database repositories.
#[derive(Clone)]
pub struct DbReportStore {
    user_repo: UserRepository,
    challan_repo: ChallanRepository,
}

impl DbReportStore {
    /// Create a new database-backed store.
    #[must_use]
    pub const fn new(user_repo: UserRepository, challan_repo: ChallanRepository) -> Self {
        Self {
            user_repo,
            challan_repo,
        }
    }
}

#[async_trait]
impl ReportStore for DbReportStore {
    async fn list_users(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_all().await
    }

    async fn list_reports(&self) -> AppResult<Vec<ReportSnapshot>> {
        let reports = self.challan_repo.find_all_chronological().await?;
        Ok(reports.into_iter().map(ReportSnapshot::from).collect())
    }
}

/// Store holding its snapshot in memory.
///
/// Used for tests and for seeding fixtures without a database.
#[derive(Default)]
pub struct InMemoryReportStore {
    users: RwLock<Vec<user::Model>>,
    reports: RwLock<Vec<ReportSnapshot>>,
}

impl InMemoryReportStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from existing collections.
    #[must_use]
    pub fn with_data(users: Vec<user::Model>, reports: Vec<ReportSnapshot>) -> Self {
        Self {
            users: RwLock::new(users),
            reports: RwLock::new(reports),
        }
    }

    /// Append a user.
    pub async fn add_user(&self, user: user::Model) {
        self.users.write().await.push(user);
    }

    /// Append a report.
    pub async fn add_report(&self, report: ReportSnapshot) {
        self.reports.write().await.push(report);
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn list_users(&self) -> AppResult<Vec<user::Model>> {
        Ok(self.users.read().await.clone())
    }

    async fn list_reports(&self) -> AppResult<Vec<ReportSnapshot>> {
        Ok(self.reports.read().await.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use challan_db::entities::user::UserRole;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_string(),
            token: None,
            role: UserRole::Citizen,
            specialization: None,
            is_blacklisted: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_challan(id: &str, reporter: Option<&str>) -> challan::Model {
        challan::Model {
            id: id.to_string(),
            number_plate: "TN-09-BX-0001".to_string(),
            description: "No helmet".to_string(),
            image_url: format!("/uploads/{id}.jpg"),
            location: json!({}),
            reported_by: reporter.map(ToString::to_string),
            reporter_name: None,
            tags: json!(["NoHelmet"]),
            status: ChallanStatus::Approved,
            reviewed_by: Some("r1".to_string()),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_snapshot_from_model() {
        let snapshot = ReportSnapshot::from(test_challan("c1", Some("u1")));

        assert_eq!(snapshot.id, "c1");
        assert_eq!(snapshot.reported_by.as_deref(), Some("u1"));
        assert_eq!(snapshot.status, Some(ChallanStatus::Approved));
        assert_eq!(snapshot.tags, vec!["NoHelmet"]);
    }

    #[tokio::test]
    async fn test_in_memory_store_returns_what_was_added() {
        let store = InMemoryReportStore::new();
        store.add_user(test_user("u1")).await;
        store
            .add_report(ReportSnapshot {
                id: "c1".to_string(),
                reported_by: Some("u1".to_string()),
                status: None,
                tags: vec![],
            })
            .await;

        assert_eq!(store.list_users().await.unwrap().len(), 1);
        let reports = store.list_reports().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, None);
    }

    #[tokio::test]
    async fn test_db_store_maps_challans() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_challan("c1", Some("u1")), test_challan("c2", None)]])
                .into_connection(),
        );

        let store = DbReportStore::new(
            UserRepository::new(Arc::clone(&db)),
            ChallanRepository::new(Arc::clone(&db)),
        );
        let reports = store.list_reports().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].reported_by, None);
    }
}
