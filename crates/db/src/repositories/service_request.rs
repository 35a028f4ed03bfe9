//! Service request repository.

use std::sync::Arc;

use crate::entities::{
    ServiceRequest,
    service_request::{self, ServiceRequestStatus},
};
use challan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Service request repository for database operations.
#[derive(Clone)]
pub struct ServiceRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl ServiceRequestRepository {
    /// Create a new service request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new service request.
    pub async fn create(
        &self,
        model: service_request::ActiveModel,
    ) -> AppResult<service_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a service request by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<service_request::Model> {
        ServiceRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Service request {id} not found")))
    }

    /// Requests created by a citizen, newest first.
    pub async fn find_by_requester(
        &self,
        requester_id: &str,
    ) -> AppResult<Vec<service_request::Model>> {
        ServiceRequest::find()
            .filter(service_request::Column::RequesterId.eq(requester_id))
            .order_by_desc(service_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests a provider can see: pending ones in its specialization (any
    /// type when it has none) plus everything already assigned to it.
    pub async fn find_for_provider(
        &self,
        provider_id: &str,
        specialization: Option<&str>,
    ) -> AppResult<Vec<service_request::Model>> {
        let mut open = Condition::all()
            .add(service_request::Column::Status.eq(ServiceRequestStatus::Pending))
            .add(service_request::Column::ProviderId.is_null());
        if let Some(spec) = specialization {
            open = open.add(service_request::Column::ServiceType.eq(spec));
        }

        ServiceRequest::find()
            .filter(
                Condition::any()
                    .add(open)
                    .add(service_request::Column::ProviderId.eq(provider_id)),
            )
            .order_by_desc(service_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All requests, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<service_request::Model>> {
        ServiceRequest::find()
            .order_by_desc(service_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a service request.
    pub async fn update(
        &self,
        model: service_request::ActiveModel,
    ) -> AppResult<service_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
