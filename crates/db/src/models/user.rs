//! User account model and DTOs.

use editai_core::quota::SubscriptionTier;
use editai_core::types::{DbId, Timestamp};
use serde::Serialize;

/// A stored user account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    /// Stored lower-cased; unique.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub subscription_tier: SubscriptionTier,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub subscription_tier: SubscriptionTier,
}
