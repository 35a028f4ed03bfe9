//! Core business logic for the challan portal.

pub mod services;

pub use services::*;
