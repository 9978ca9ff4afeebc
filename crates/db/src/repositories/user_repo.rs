//! Repository for user accounts.

use chrono::Utc;
use editai_core::quota::SubscriptionTier;
use editai_core::types::DbId;

use crate::models::user::{CreateUser, User};
use crate::{DbError, DbPool};

/// Unique constraint on lower-cased email addresses.
pub const UQ_USERS_EMAIL: &str = "uq_users_email";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// Emails are compared case-insensitively.
    pub async fn create(pool: &DbPool, input: &CreateUser) -> Result<User, DbError> {
        let email = normalize_email(&input.email);
        let mut table = pool.users.write().await;
        if table.rows.values().any(|u| u.email == email) {
            return Err(DbError::UniqueViolation {
                constraint: UQ_USERS_EMAIL,
            });
        }

        table.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: table.last_id,
            name: input.name.trim().to_string(),
            email,
            password_hash: input.password_hash.clone(),
            subscription_tier: input.subscription_tier,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<User>, DbError> {
        Ok(pool.users.read().await.rows.get(&id).cloned())
    }

    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, DbError> {
        let email = normalize_email(email);
        Ok(pool
            .users
            .read()
            .await
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    /// Change a user's subscription tier, returning the updated row.
    pub async fn update_tier(
        pool: &DbPool,
        id: DbId,
        tier: SubscriptionTier,
    ) -> Result<User, DbError> {
        let mut table = pool.users.write().await;
        let user = table.rows.get_mut(&id).ok_or(DbError::RowNotFound)?;
        user.subscription_tier = tier;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
