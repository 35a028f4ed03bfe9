//! Vehicle-service request entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service request workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ServiceRequestStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ServiceRequestStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether `next` is a legal successor of this status.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Accepted, Self::Scheduled)
                | (Self::Scheduled, Self::Completed)
                | (Self::Pending | Self::Accepted | Self::Scheduled, Self::Rejected)
        )
    }
}

/// Service request model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Citizen who asked for the service.
    #[sea_orm(indexed)]
    pub requester_id: String,
    pub vehicle_number: String,
    /// Matched against provider specialization.
    pub service_type: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(nullable)]
    pub preferred_date: Option<DateTimeWithTimeZone>,
    pub status: ServiceRequestStatus,
    /// Provider who accepted the request.
    #[sea_orm(indexed, nullable)]
    pub provider_id: Option<String>,
    #[sea_orm(nullable)]
    pub scheduled_for: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequesterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Requester,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requester.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::ServiceRequestStatus::*;

    #[test]
    fn test_forward_transitions() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Accepted.can_transition_to(Scheduled));
        assert!(Scheduled.can_transition_to(Completed));
    }

    #[test]
    fn test_rejection_only_before_completion() {
        assert!(Pending.can_transition_to(Rejected));
        assert!(Scheduled.can_transition_to(Rejected));
        assert!(!Completed.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Rejected));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!Pending.can_transition_to(Scheduled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Pending));
    }
}
