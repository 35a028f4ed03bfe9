//! Database entities.

pub mod challan;
pub mod service_request;
pub mod user;

pub use challan::Entity as Challan;
pub use service_request::Entity as ServiceRequest;
pub use user::Entity as User;
