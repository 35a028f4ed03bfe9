//! Challan (traffic-violation report) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a challan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ChallanStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ChallanStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a wire name. Returns `None` for anything unrecognised.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Challan model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "challan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Plate of the offending vehicle.
    pub number_plate: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Evidence photo.
    pub image_url: String,
    /// Free-form location object from the client (lat/lng/address).
    #[sea_orm(column_type = "JsonBinary")]
    pub location: Json,
    /// Submitting user. `None` once the user is gone.
    #[sea_orm(indexed, nullable)]
    pub reported_by: Option<String>,
    /// Display name of the submitter at submission time.
    #[sea_orm(nullable)]
    pub reporter_name: Option<String>,
    /// Classification tags (JSON array of strings).
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub status: ChallanStatus,
    /// Reviewer who approved or rejected the challan.
    #[sea_orm(nullable)]
    pub reviewed_by: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Tags as strings. Non-string array members are ignored.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReportedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Reporter,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reporter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parse() {
        assert_eq!(ChallanStatus::parse("approved"), Some(ChallanStatus::Approved));
        assert_eq!(ChallanStatus::parse("all"), None);
        assert_eq!(ChallanStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_tag_list_skips_non_strings() {
        let model = Model {
            id: "c1".to_string(),
            number_plate: "KA-01-AB-1234".to_string(),
            description: "Signal jump".to_string(),
            image_url: "/uploads/c1.jpg".to_string(),
            location: json!({}),
            reported_by: None,
            reporter_name: None,
            tags: json!(["Speeding", 3, "NoHelmet"]),
            status: ChallanStatus::Pending,
            reviewed_by: None,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        };

        assert_eq!(model.tag_list(), vec!["Speeding", "NoHelmet"]);
    }
}
