//! Portal-wide report statistics.

use challan_common::AppResult;
use challan_db::entities::{challan::ChallanStatus, user, user::UserRole};
use serde::Serialize;

use super::store::{ReportSnapshot, StoreService};

/// Headline counters shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalStats {
    pub total_challans: u64,
    pub pending_challans: u64,
    pub approved_challans: u64,
    pub rejected_challans: u64,
    /// Registered citizens.
    pub total_users: u64,
}

/// Count reports by status and citizens by role.
///
/// Status-less reports count toward `total_challans` only.
#[must_use]
pub fn compute_stats(users: &[user::Model], reports: &[ReportSnapshot]) -> PortalStats {
    let mut stats = reports.iter().fold(PortalStats::default(), |mut acc, r| {
        acc.total_challans += 1;
        match r.status {
            Some(ChallanStatus::Pending) => acc.pending_challans += 1,
            Some(ChallanStatus::Approved) => acc.approved_challans += 1,
            Some(ChallanStatus::Rejected) => acc.rejected_challans += 1,
            None => {}
        }
        acc
    });
    stats.total_users = users.iter().filter(|u| u.role == UserRole::Citizen).count() as u64;
    stats
}

/// Portal-wide counters over the report store.
#[derive(Clone)]
pub struct StatsService {
    store: StoreService,
}

impl StatsService {
    /// Create a new stats service.
    #[must_use]
    pub const fn new(store: StoreService) -> Self {
        Self { store }
    }

    /// Load users and reports, then count them.
    pub async fn compute(&self) -> AppResult<PortalStats> {
        let users = self.store.list_users().await?;
        let reports = self.store.list_reports().await?;
        Ok(compute_stats(&users, &reports))
    }
}
