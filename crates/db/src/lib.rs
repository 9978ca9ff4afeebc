//! In-memory storage for users and plan history.
//!
//! Stands in for the persistent store behind the same repository-style API
//! (`UserRepo::create(&pool, ..)`, `PlanRepo::list_for_user(&pool, ..)`).
//! Each table sits behind its own `tokio::sync::RwLock`; no lock is held
//! across calls into other components.

pub mod models;
pub mod repositories;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use editai_core::plan::EditPlan;
use editai_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::user::User;

pub type DbPool = Arc<Database>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// No row matched the lookup.
    #[error("row not found")]
    RowNotFound,

    /// An insert or update would duplicate a unique value.
    #[error("duplicate value violates unique constraint {constraint}")]
    UniqueViolation { constraint: &'static str },
}

/// Backing tables.
#[derive(Debug, Default)]
pub struct Database {
    pub(crate) users: RwLock<UserTable>,
    /// Plan history per user, ordered by `created_at`.
    pub(crate) plans: RwLock<HashMap<DbId, Vec<EditPlan>>>,
}

#[derive(Debug, Default)]
pub(crate) struct UserTable {
    pub(crate) last_id: DbId,
    pub(crate) rows: BTreeMap<DbId, User>,
}

/// Create an empty store.
pub fn create_pool() -> DbPool {
    Arc::new(Database::default())
}

/// Verify the store is usable (both tables can be locked for reading).
pub async fn health_check(pool: &DbPool) -> Result<(), DbError> {
    let users = pool.users.read().await.rows.len();
    let histories = pool.plans.read().await.len();
    tracing::trace!(users, histories, "Store health check");
    Ok(())
}
