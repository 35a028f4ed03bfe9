//! Citizen leaderboard.
//!
//! Ranks citizen reporters by how many challans they have submitted. The
//! ranking is a pure function of a user snapshot and a report snapshot:
//!
//! - every citizen gets exactly one entry, including citizens with no reports;
//! - reports from unknown, absent or non-citizen submitters count nowhere;
//! - a report without a readable status still counts toward
//!   `total_reports` but toward none of the per-status counters;
//! - entries are ordered by `total_reports` descending, and equal totals keep
//!   the order in which users were loaded;
//! - ranks are positions (1, 2, 3, ...), never shared and never skipped;
//! - `top_tag` is the most frequent lower-cased tag, with ties going to the
//!   tag seen first.

use challan_common::AppResult;
use challan_db::entities::{challan::ChallanStatus, user, user::UserRole};
use indexmap::IndexMap;
use serde::Serialize;

use super::store::{ReportSnapshot, StoreService};

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub email: String,
    pub total_reports: u64,
    pub approved_reports: u64,
    pub pending_reports: u64,
    pub rejected_reports: u64,
    /// Tag frequencies in first-seen order.
    #[serde(skip)]
    pub tag_counts: IndexMap<String, u64>,
    pub top_tag: Option<String>,
    pub rank: u64,
}

impl LeaderboardEntry {
    fn empty(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            total_reports: 0,
            approved_reports: 0,
            pending_reports: 0,
            rejected_reports: 0,
            tag_counts: IndexMap::new(),
            top_tag: None,
            rank: 0,
        }
    }

    fn record(&mut self, report: &ReportSnapshot) {
        self.total_reports += 1;
        match report.status {
            Some(ChallanStatus::Approved) => self.approved_reports += 1,
            Some(ChallanStatus::Pending) => self.pending_reports += 1,
            Some(ChallanStatus::Rejected) => self.rejected_reports += 1,
            None => {}
        }

        for tag in &report.tags {
            let tag = normalize_tag(tag);
            if tag.is_empty() {
                continue;
            }
            *self.tag_counts.entry(tag).or_insert(0) += 1;
        }
    }
}

/// Lower-case and trim a tag for counting.
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Highest-count tag; the earliest inserted tag wins ties.
fn top_tag(tag_counts: &IndexMap<String, u64>) -> Option<String> {
    let mut best: Option<(&String, u64)> = None;
    for (tag, &count) in tag_counts {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((tag, count)),
        }
    }
    best.map(|(tag, _)| tag.clone())
}

/// Build the ranked leaderboard from a snapshot of users and reports.
#[must_use]
pub fn compute_leaderboard(
    users: &[user::Model],
    reports: &[ReportSnapshot],
) -> Vec<LeaderboardEntry> {
    let mut accumulators: IndexMap<&str, LeaderboardEntry> = IndexMap::new();
    for user in users.iter().filter(|u| u.role == UserRole::Citizen) {
        accumulators
            .entry(user.id.as_str())
            .or_insert_with(|| LeaderboardEntry::empty(user));
    }

    for report in reports {
        let Some(entry) = report
            .reported_by
            .as_deref()
            .and_then(|id| accumulators.get_mut(id))
        else {
            continue;
        };
        entry.record(report);
    }

    let mut entries: Vec<LeaderboardEntry> = accumulators.into_values().collect();
    // Stable: equal totals keep load order
    entries.sort_by(|a, b| b.total_reports.cmp(&a.total_reports));

    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = position as u64 + 1;
        entry.top_tag = top_tag(&entry.tag_counts);
    }

    entries
}

/// Leaderboard service reading through a [`ReportStore`](super::store::ReportStore).
#[derive(Clone)]
pub struct LeaderboardService {
    store: StoreService,
}

impl LeaderboardService {
    /// Create a new leaderboard service.
    #[must_use]
    pub const fn new(store: StoreService) -> Self {
        Self { store }
    }

    /// Load a fresh snapshot and rank it.
    ///
    /// Store failures are returned unchanged.
    pub async fn compute(&self) -> AppResult<Vec<LeaderboardEntry>> {
        let users = self.store.list_users().await?;
        let reports = self.store.list_reports().await?;

        let leaderboard = compute_leaderboard(&users, &reports);
        tracing::debug!(
            users = users.len(),
            reports = reports.len(),
            entries = leaderboard.len(),
            "Computed leaderboard"
        );

        Ok(leaderboard)
    }
}
