pub mod auth;
pub mod plans;
pub mod usage;
