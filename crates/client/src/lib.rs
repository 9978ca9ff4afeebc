//! HTTP client for the EditAI API.
//!
//! [`ApiClient`] wraps the REST endpoints with [`reqwest`] and implements
//! [`editai_core::session::PlanBackend`], so a [`PlanSession`] can drive a
//! live server exactly as it drives an in-process fake.
//!
//! [`PlanSession`]: editai_core::session::PlanSession

pub mod api;
pub mod error;

pub use api::{ApiClient, AuthResponse, ExportDownload, UsageReport, UserInfo};
pub use error::ClientError;
