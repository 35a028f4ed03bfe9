//! HTTP API layer for the challan portal.
//!
//! - **Endpoints**: auth, challans, service requests, users, stats, leaderboard
//! - **Extractors**: the authenticated user
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
