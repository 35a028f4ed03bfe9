//! Business logic services.

#![allow(missing_docs)]

pub mod challan;
pub mod leaderboard;
pub mod service_request;
pub mod stats;
pub mod store;
pub mod user;

pub use challan::{ChallanService, CreateChallanInput, TagsInput};
pub use leaderboard::{LeaderboardEntry, LeaderboardService, compute_leaderboard};
pub use service_request::{
    CreateServiceRequestInput, ServiceRequestService, UpdateServiceRequestInput,
};
pub use stats::{PortalStats, StatsService, compute_stats};
pub use store::{DbReportStore, InMemoryReportStore, ReportSnapshot, ReportStore, StoreService};
pub use user::{RegisterInput, UserService};
