//! Repositories wrapping database access per entity.

pub mod challan;
pub mod service_request;
pub mod user;

pub use challan::ChallanRepository;
pub use service_request::ServiceRequestRepository;
pub use user::UserRepository;
