//! Handler for `GET /usage`.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use editai_core::quota::{BillingPeriod, Usage};
use editai_db::repositories::PlanRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::auth::load_user;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Quota usage for the current UTC billing month.
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    #[serde(flatten)]
    pub usage: Usage,
    /// `null` for unlimited tiers.
    pub remaining: Option<u32>,
}

/// GET /api/usage
pub async fn get_usage(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<UsageResponse>> {
    let user = load_user(&state, auth_user.user_id).await?;
    let period = BillingPeriod::containing(Utc::now());
    let used = PlanRepo::count_created_between(&state.pool, user.id, period.start, period.end).await?;
    let usage = Usage::new(
        user.subscription_tier,
        used,
        state.config.free_tier_monthly_plans,
        period,
    );
    Ok(Json(UsageResponse {
        remaining: usage.remaining(),
        usage,
    }))
}
