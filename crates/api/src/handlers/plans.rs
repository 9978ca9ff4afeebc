//! Handlers for the `/plans` resource.
//!
//! Generation order per request: validate the command, claim the user's
//! in-flight slot, check quota, call the generator, validate its output,
//! append to history. Quota counting and the append both happen while the
//! slot is held, so concurrent requests cannot overrun the monthly limit.

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use editai_core::command::validate_command;
use editai_core::error::CoreError;
use editai_core::export::{export_plan, ExportFormat};
use editai_core::generation::GenerationRequest;
use editai_core::plan::EditPlan;
use editai_core::quota::{check_quota, BillingPeriod};
use editai_core::validation::validate_plan;
use editai_db::repositories::PlanRepo;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::auth::load_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::json::AppJson;
use crate::state::AppState;

/// Request body for `POST /plans/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Missing is treated like empty so it fails command validation.
    #[serde(default)]
    pub command: String,
}

/// Query parameters for `GET /plans/{id}/export`.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// POST /api/plans/generate
pub async fn generate(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<GenerateRequest>,
) -> AppResult<Json<EditPlan>> {
    let command = validate_command(&input.command)?;
    let user = load_user(&state, auth_user.user_id).await?;

    let _guard = state.in_flight.try_acquire(user.id)?;

    let period = BillingPeriod::containing(Utc::now());
    let used = PlanRepo::count_created_between(&state.pool, user.id, period.start, period.end).await?;
    check_quota(
        user.subscription_tier,
        used,
        state.config.free_tier_monthly_plans,
    )?;

    let request = GenerationRequest {
        command,
        user_id: user.id,
        tier: user.subscription_tier,
    };
    let plan = state
        .generator
        .generate(&request)
        .await
        .map_err(normalize_generation_error)?;

    let report = validate_plan(&plan)
        .map_err(|e| CoreError::GenerationFailed(format!("generator returned an invalid plan: {e}")))?;
    if !report.warnings.is_empty() {
        tracing::warn!(
            plan_id = %plan.id,
            warnings = ?report.warnings,
            "Generated plan has warnings"
        );
    }

    let plan = PlanRepo::create(&state.pool, user.id, &plan).await?;
    tracing::info!(
        user_id = user.id,
        plan_id = %plan.id,
        scenes = plan.scenes.len(),
        used = used + 1,
        "Generated plan"
    );

    Ok(Json(plan))
}

/// GET /api/plans
///
/// The caller's plan history, oldest first.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<EditPlan>>> {
    let plans = PlanRepo::list_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(plans))
}

/// GET /api/plans/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<EditPlan>> {
    let plan = find_plan(&state, auth_user, &id).await?;
    Ok(Json(plan))
}

/// GET /api/plans/{id}/export?format=json|text|pdf
///
/// Downloads the plan as an attachment. `format` defaults to `json`.
pub async fn export(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let format = match query.format.as_deref() {
        Some(raw) => raw.parse::<ExportFormat>()?,
        None => ExportFormat::Json,
    };
    let plan = find_plan(&state, auth_user, &id).await?;
    let artifact = export_plan(&plan, format)?;

    tracing::info!(plan_id = %plan.id, format = %format, "Exported plan");

    Ok((
        [
            (CONTENT_TYPE, artifact.content_type.to_string()),
            (CONTENT_DISPOSITION, content_disposition(&artifact.file_name)),
        ],
        artifact.bytes,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_plan(state: &AppState, auth_user: AuthUser, raw_id: &str) -> AppResult<EditPlan> {
    let plan_id = Uuid::parse_str(raw_id)
        .map_err(|_| AppError::BadRequest(format!("Invalid plan id '{raw_id}'")))?;
    PlanRepo::find_for_user(&state.pool, auth_user.user_id, plan_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "EditPlan",
                id: plan_id.to_string(),
            })
        })
}

/// Generators may fail in arbitrary ways; callers only ever see quota or
/// generation failures from this step.
fn normalize_generation_error(err: CoreError) -> CoreError {
    match err {
        CoreError::GenerationFailed(_) | CoreError::QuotaExceeded { .. } => err,
        other => CoreError::GenerationFailed(other.to_string()),
    }
}

/// `attachment` disposition with an ASCII fallback name and an RFC 5987
/// UTF-8 name for titles outside ASCII.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect();
    if fallback == file_name {
        return format!("attachment; filename=\"{fallback}\"");
    }
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}
