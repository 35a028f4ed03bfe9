//! Challan (violation report) service.

use challan_common::{AppError, AppResult, IdGenerator};
use challan_db::{
    entities::{challan, challan::ChallanStatus, user, user::UserRole},
    repositories::ChallanRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

/// Tags as sent by clients: either a list or one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Joined(String),
}

impl Default for TagsInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl TagsInput {
    /// Split, trim and drop empty tags. Case is preserved.
    #[must_use]
    pub fn into_tags(self) -> Vec<String> {
        let raw = match self {
            Self::List(tags) => tags,
            Self::Joined(joined) => joined.split(',').map(ToString::to_string).collect(),
        };
        raw.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Input for submitting a challan.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallanInput {
    #[validate(length(min = 1, max = 32))]
    pub number_plate: String,

    #[validate(length(max = 4096))]
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub location: Option<serde_json::Value>,

    #[serde(default)]
    pub tags: TagsInput,
}

/// Challan service for business logic.
#[derive(Clone)]
pub struct ChallanService {
    challan_repo: ChallanRepository,
    id_gen: IdGenerator,
}

impl ChallanService {
    /// Create a new challan service.
    #[must_use]
    pub const fn new(challan_repo: ChallanRepository) -> Self {
        Self {
            challan_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new report on behalf of `reporter`.
    pub async fn create(
        &self,
        reporter: &user::Model,
        input: CreateChallanInput,
    ) -> AppResult<challan::Model> {
        if reporter.is_blacklisted {
            return Err(AppError::Forbidden(
                "Blacklisted users cannot submit reports".to_string(),
            ));
        }
        input.validate()?;

        let image_url = input
            .image_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::BadRequest("Image is required".to_string()))?;

        let tags = input.tags.into_tags();
        let now = chrono::Utc::now();

        let model = challan::ActiveModel {
            id: Set(self.id_gen.generate()),
            number_plate: Set(input.number_plate.trim().to_uppercase()),
            description: Set(input.description),
            image_url: Set(image_url),
            location: Set(input.location.unwrap_or_else(|| json!({}))),
            reported_by: Set(Some(reporter.id.clone())),
            reporter_name: Set(Some(reporter.name.clone())),
            tags: Set(json!(tags)),
            status: Set(ChallanStatus::Pending),
            reviewed_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = self.challan_repo.create(model).await?;
        tracing::info!(challan_id = %created.id, reporter = %reporter.id, "Challan submitted");

        Ok(created)
    }

    /// List reports, newest first.
    ///
    /// `status` accepts `pending`, `approved`, `rejected`, or `all`.
    pub async fn list(&self, status: Option<&str>) -> AppResult<Vec<challan::Model>> {
        let filter = match status.map(str::trim) {
            None | Some("" | "all") => None,
            Some(s) => Some(
                ChallanStatus::parse(s)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {s}")))?,
            ),
        };
        self.challan_repo.find_all(filter).await
    }

    /// A single submitter's reports, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<challan::Model>> {
        self.challan_repo.find_by_reporter(user_id).await
    }

    /// Approve or reject a pending report.
    pub async fn update_status(
        &self,
        reviewer: &user::Model,
        id: &str,
        status: &str,
    ) -> AppResult<challan::Model> {
        if reviewer.role != UserRole::Reviewer {
            return Err(AppError::Forbidden(
                "Only reviewers can change report status".to_string(),
            ));
        }

        let target = match ChallanStatus::parse(status.trim()) {
            Some(s @ (ChallanStatus::Approved | ChallanStatus::Rejected)) => s,
            _ => {
                return Err(AppError::BadRequest(
                    "Status must be approved or rejected".to_string(),
                ))
            }
        };

        let existing = self.challan_repo.get_by_id(id).await?;
        if existing.status != ChallanStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Challan is already {}",
                existing.status.as_str()
            )));
        }

        if !self
            .challan_repo
            .review_pending(id, target, &reviewer.id)
            .await?
        {
            return Err(AppError::Conflict(
                "Challan was reviewed concurrently".to_string(),
            ));
        }

        let updated = self.challan_repo.get_by_id(id).await?;
        tracing::info!(
            challan_id = %updated.id,
            reviewer = %reviewer.id,
            status = target.as_str(),
            "Challan reviewed"
        );

        Ok(updated)
    }

    /// Delete a report.
    ///
    /// Reviewers can delete any report; a submitter only its own pending ones.
    pub async fn delete(&self, actor: &user::Model, id: &str) -> AppResult<()> {
        let existing = self.challan_repo.get_by_id(id).await?;

        let is_owner = existing.reported_by.as_deref() == Some(actor.id.as_str());
        let allowed = actor.role == UserRole::Reviewer
            || (is_owner && existing.status == ChallanStatus::Pending);
        if !allowed {
            return Err(AppError::Forbidden(
                "You cannot delete this report".to_string(),
            ));
        }

        self.challan_repo.delete(id).await?;
        tracing::info!(challan_id = %id, by = %actor.id, "Challan deleted");

        Ok(())
    }
}
