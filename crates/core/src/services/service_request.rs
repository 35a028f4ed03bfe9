//! Vehicle service request workflow.

use challan_common::{AppError, AppResult, IdGenerator};
use challan_db::{
    entities::{service_request, service_request::ServiceRequestStatus, user, user::UserRole},
    repositories::ServiceRequestRepository,
};
use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for a citizen's service request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequestInput {
    #[validate(length(min = 1, max = 32))]
    pub vehicle_number: String,

    #[validate(length(min = 1, max = 64))]
    pub service_type: String,

    #[validate(length(max = 4096))]
    #[serde(default)]
    pub description: String,

    pub preferred_date: Option<DateTime<Utc>>,
}

/// Input for a provider moving a request along its workflow.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequestInput {
    pub status: String,
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Service request workflow between citizens and providers.
#[derive(Clone)]
pub struct ServiceRequestService {
    request_repo: ServiceRequestRepository,
    id_gen: IdGenerator,
}

impl ServiceRequestService {
    /// Create a new service request service.
    #[must_use]
    pub const fn new(request_repo: ServiceRequestRepository) -> Self {
        Self {
            request_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Open a new request. Citizens only.
    pub async fn create(
        &self,
        requester: &user::Model,
        input: CreateServiceRequestInput,
    ) -> AppResult<service_request::Model> {
        if requester.role != UserRole::Citizen {
            return Err(AppError::Forbidden(
                "Only citizens can request services".to_string(),
            ));
        }
        input.validate()?;

        let now = Utc::now();
        let model = service_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            requester_id: Set(requester.id.clone()),
            vehicle_number: Set(input.vehicle_number.trim().to_uppercase()),
            service_type: Set(input.service_type.trim().to_string()),
            description: Set(input.description),
            preferred_date: Set(input.preferred_date.map(Into::into)),
            status: Set(ServiceRequestStatus::Pending),
            provider_id: Set(None),
            scheduled_for: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = self.request_repo.create(model).await?;
        tracing::info!(request_id = %created.id, requester = %requester.id, "Service request created");

        Ok(created)
    }

    /// Requests visible to `viewer`.
    ///
    /// Providers see open requests in their specialization plus their own
    /// assignments; reviewers see everything.
    pub async fn list_for(&self, viewer: &user::Model) -> AppResult<Vec<service_request::Model>> {
        match viewer.role {
            UserRole::ServiceProvider => {
                self.request_repo
                    .find_for_provider(&viewer.id, viewer.specialization.as_deref())
                    .await
            }
            UserRole::Reviewer => self.request_repo.find_all().await,
            UserRole::Citizen => Err(AppError::Forbidden(
                "Citizens can only list their own requests".to_string(),
            )),
        }
    }

    /// Requests opened by `requester`, newest first.
    pub async fn list_mine(
        &self,
        requester: &user::Model,
    ) -> AppResult<Vec<service_request::Model>> {
        self.request_repo.find_by_requester(&requester.id).await
    }

    /// Move a request to its next status.
    pub async fn update_status(
        &self,
        provider: &user::Model,
        id: &str,
        input: UpdateServiceRequestInput,
    ) -> AppResult<service_request::Model> {
        if provider.role != UserRole::ServiceProvider {
            return Err(AppError::Forbidden(
                "Only service providers can update requests".to_string(),
            ));
        }

        let next = ServiceRequestStatus::parse(input.status.trim())
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {}", input.status)))?;

        let existing = self.request_repo.get_by_id(id).await?;

        match existing.provider_id.as_deref() {
            Some(assignee) if assignee != provider.id => {
                return Err(AppError::Forbidden(
                    "Request is assigned to another provider".to_string(),
                ));
            }
            // Unassigned requests follow the same visibility as `list_for`.
            None if provider
                .specialization
                .as_deref()
                .is_some_and(|spec| spec != existing.service_type) =>
            {
                return Err(AppError::Forbidden(
                    "Request is outside your specialization".to_string(),
                ));
            }
            _ => {}
        }

        if !existing.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Cannot move request from {} to {}",
                existing.status.as_str(),
                next.as_str()
            )));
        }

        let scheduled_for = match next {
            ServiceRequestStatus::Scheduled => Some(input.scheduled_for.ok_or_else(|| {
                AppError::BadRequest("scheduledFor is required when scheduling".to_string())
            })?),
            _ => None,
        };

        let previous = existing.status;
        let mut active: service_request::ActiveModel = existing.into();
        active.status = Set(next);
        if next == ServiceRequestStatus::Accepted {
            active.provider_id = Set(Some(provider.id.clone()));
        }
        if let Some(at) = scheduled_for {
            active.scheduled_for = Set(Some(at.into()));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = self.request_repo.update(active).await?;
        tracing::info!(
            request_id = %updated.id,
            provider = %provider.id,
            from = previous.as_str(),
            to = next.as_str(),
            "Service request updated"
        );

        Ok(updated)
    }
}
