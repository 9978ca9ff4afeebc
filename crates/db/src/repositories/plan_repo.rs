//! Repository for per-user plan history.
//!
//! History is append-only and kept ordered by `created_at`; plans are never
//! updated in place.

use editai_core::plan::EditPlan;
use editai_core::types::{DbId, Timestamp};
use uuid::Uuid;

use crate::{DbError, DbPool};

/// Provides append and query operations for edit plans.
pub struct PlanRepo;

impl PlanRepo {
    /// Append a plan to a user's history.
    ///
    /// Plan ids are unique across all users.
    pub async fn create(pool: &DbPool, user_id: DbId, plan: &EditPlan) -> Result<EditPlan, DbError> {
        let mut plans = pool.plans.write().await;
        if plans.values().flatten().any(|p| p.id == plan.id) {
            return Err(DbError::UniqueViolation {
                constraint: "uq_edit_plans_id",
            });
        }
        let history = plans.entry(user_id).or_default();
        // Insert after every plan created at or before this one, so equal
        // timestamps keep arrival order.
        let pos = history.partition_point(|p| p.created_at <= plan.created_at);
        history.insert(pos, plan.clone());
        Ok(plan.clone())
    }

    /// All plans for a user, oldest first.
    pub async fn list_for_user(pool: &DbPool, user_id: DbId) -> Result<Vec<EditPlan>, DbError> {
        Ok(pool
            .plans
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Find one of the user's plans. Plans owned by other users are not
    /// visible.
    pub async fn find_for_user(
        pool: &DbPool,
        user_id: DbId,
        plan_id: Uuid,
    ) -> Result<Option<EditPlan>, DbError> {
        Ok(pool
            .plans
            .read()
            .await
            .get(&user_id)
            .and_then(|history| history.iter().find(|p| p.id == plan_id))
            .cloned())
    }

    /// Count a user's plans created in `[start, end)`.
    pub async fn count_created_between(
        pool: &DbPool,
        user_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<u32, DbError> {
        let plans = pool.plans.read().await;
        let count = plans
            .get(&user_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|p| start <= p.created_at && p.created_at < end)
                    .count()
            })
            .unwrap_or(0);
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
