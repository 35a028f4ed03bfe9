//! Challan repository.

use std::sync::Arc;

use crate::entities::{
    Challan,
    challan::{self, ChallanStatus},
};
use challan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

/// Challan repository for database operations.
#[derive(Clone)]
pub struct ChallanRepository {
    db: Arc<DatabaseConnection>,
}

impl ChallanRepository {
    /// Create a new challan repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new challan.
    pub async fn create(&self, model: challan::ActiveModel) -> AppResult<challan::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a challan by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<challan::Model>> {
        Challan::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a challan by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<challan::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ChallanNotFound(id.to_string()))
    }

    /// List challans, newest first, optionally restricted to one status.
    pub async fn find_all(&self, status: Option<ChallanStatus>) -> AppResult<Vec<challan::Model>> {
        let mut query = Challan::find().order_by_desc(challan::Column::CreatedAt);

        if let Some(s) = status {
            query = query.filter(challan::Column::Status.eq(s));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Challans submitted by a user, newest first.
    pub async fn find_by_reporter(&self, user_id: &str) -> AppResult<Vec<challan::Model>> {
        Challan::find()
            .filter(challan::Column::ReportedBy.eq(user_id))
            .order_by_desc(challan::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every challan in submission order.
    ///
    /// Aggregations rely on this order for their tie-breaks.
    pub async fn find_all_chronological(&self) -> AppResult<Vec<challan::Model>> {
        Challan::find()
            .order_by_asc(challan::Column::CreatedAt)
            .order_by_asc(challan::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a review outcome while the challan is still pending.
    ///
    /// Returns `false` when the challan was no longer pending at write time.
    pub async fn review_pending(
        &self,
        id: &str,
        status: ChallanStatus,
        reviewer_id: &str,
    ) -> AppResult<bool> {
        let result = Challan::update_many()
            .col_expr(challan::Column::Status, Expr::value(status))
            .col_expr(challan::Column::ReviewedBy, Expr::value(reviewer_id))
            .col_expr(
                challan::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().fixed_offset()),
            )
            .filter(challan::Column::Id.eq(id))
            .filter(challan::Column::Status.eq(ChallanStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Delete a challan.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Challan::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::ChallanNotFound(id.to_string()));
        }

        Ok(())
    }
}
