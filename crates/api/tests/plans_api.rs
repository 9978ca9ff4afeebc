//! HTTP-level integration tests for plan generation, history and quota.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json_auth};
use editai_core::error::CoreError;
use editai_core::generation::{GenerationRequest, PlanGenerator, RuleBasedGenerator};
use editai_core::plan::EditPlan;
use editai_core::quota::SubscriptionTier;
use editai_db::repositories::UserRepo;
use serde_json::json;
use tokio::sync::Notify;

const EXAMPLE: &str = "Cut the boring intro from 0:00 to 0:15, keep the reaction from 0:20 to 0:45 and add bold yellow captions";

// ---------------------------------------------------------------------------
// Fake generators
// ---------------------------------------------------------------------------

struct FailingGenerator;

#[async_trait]
impl PlanGenerator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<EditPlan, CoreError> {
        Err(CoreError::GenerationFailed("upstream model unavailable".into()))
    }
}

/// Holds every generation until `release` is notified.
struct GatedGenerator {
    release: Notify,
}

#[async_trait]
impl PlanGenerator for GatedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<EditPlan, CoreError> {
        self.release.notified().await;
        RuleBasedGenerator::new().generate(request).await
    }
}

/// Returns a plan that fails structural validation.
struct BrokenPlanGenerator;

#[async_trait]
impl PlanGenerator for BrokenPlanGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<EditPlan, CoreError> {
        Ok(EditPlan::new("", chrono::Utc::now()))
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_returns_structured_plan_and_appends_history() {
    let app = common::build_test_app(common::test_state());
    let (_, token) = common::register(&app, "gen@example.com").await;

    let response = common::generate(&app, &token, EXAMPLE).await;
    assert_eq!(response.status(), StatusCode::OK);
    let plan = body_json(response).await;

    assert!(plan["id"].is_string());
    assert!(plan["created_at"].is_string());
    assert_eq!(plan["scenes"][0]["action"], "CUT");
    assert_eq!(plan["scenes"][0]["start_time"], "0:00");
    assert_eq!(plan["scenes"][0]["end_time"], "0:15");
    assert_eq!(plan["scenes"][1]["action"], "KEEP");
    assert_eq!(plan["scenes"][1]["start_time"], "0:20");
    assert_eq!(plan["captions"][0]["style"], "bold-yellow");
    assert!(plan.get("transitions").is_none());

    let history = body_json(get_auth(app, "/api/plans", &token).await).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], plan["id"]);
}

#[tokio::test]
async fn empty_and_oversized_commands_are_rejected() {
    let app = common::build_test_app(common::test_state());
    let (_, token) = common::register(&app, "val@example.com").await;

    let empty = common::generate(&app, &token, "   ").await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    let json = body_json(empty).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Please enter a command");

    let long = common::generate(&app, &token, &"x".repeat(1001)).await;
    assert_eq!(long.status(), StatusCode::BAD_REQUEST);

    let boundary = common::generate(&app, &token, &"x".repeat(1000)).await;
    assert_eq!(boundary.status(), StatusCode::OK);

    let missing = post_json_auth(app.clone(), "/api/plans/generate", json!({}), &token).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let history = body_json(get_auth(app, "/api/plans", &token).await).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_bodies_get_the_error_envelope() {
    let app = common::build_test_app(common::test_state());
    let (_, token) = common::register(&app, "body@example.com").await;

    let wrong_type =
        post_json_auth(app.clone(), "/api/plans/generate", json!({ "command": 42 }), &token).await;
    assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);
    let json = body_json(wrong_type).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("command"));

    let not_json = common::post_raw_auth(
        app.clone(),
        "/api/plans/generate",
        Some("application/json"),
        "cut from 0:01 to 0:02",
        &token,
    )
    .await;
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(not_json).await["code"], "BAD_REQUEST");

    let no_content_type = common::post_raw_auth(
        app.clone(),
        "/api/plans/generate",
        None,
        r#"{"command":"cut from 0:01 to 0:02"}"#,
        &token,
    )
    .await;
    assert_eq!(no_content_type.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(no_content_type).await["code"], "BAD_REQUEST");

    let history = body_json(get_auth(app, "/api/plans", &token).await).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn generate_requires_auth() {
    let app = common::build_test_app(common::test_state());
    let response =
        common::post_json(app, "/api/plans/generate", json!({ "command": EXAMPLE })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn backwards_range_is_a_generation_failure() {
    let app = common::build_test_app(common::test_state());
    let (_, token) = common::register(&app, "back@example.com").await;

    let response = common::generate(&app, &token, "Cut from 1:00 to 0:30").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "GENERATION_FAILED");
}

#[tokio::test]
async fn failed_generation_leaves_history_and_quota_untouched() {
    let state = common::test_state_with_generator(Arc::new(FailingGenerator));
    let app = common::build_test_app(state.clone());
    let (user_id, token) = common::register(&app, "fail@example.com").await;

    let response = common::generate(&app, &token, EXAMPLE).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATION_FAILED");
    assert!(json["error"].as_str().unwrap().contains("Please try again"));

    let history = body_json(get_auth(app.clone(), "/api/plans", &token).await).await;
    assert!(history.as_array().unwrap().is_empty());
    let usage = body_json(get_auth(app, "/api/usage", &token).await).await;
    assert_eq!(usage["used"], 0);
    assert!(!state.in_flight.is_generating(user_id));
}

#[tokio::test]
async fn invalid_generated_plan_is_not_stored() {
    let app = common::build_test_app(common::test_state_with_generator(Arc::new(
        BrokenPlanGenerator,
    )));
    let (_, token) = common::register(&app, "broken@example.com").await;

    let response = common::generate(&app, &token, EXAMPLE).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let history = body_json(get_auth(app, "/api/plans", &token).await).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_generation_for_same_user_conflicts() {
    let generator = Arc::new(GatedGenerator {
        release: Notify::new(),
    });
    let state = common::test_state_with_generator(generator.clone());
    let app = common::build_test_app(state.clone());
    let (user_id, token) = common::register(&app, "busy@example.com").await;

    let first = tokio::spawn({
        let app = app.clone();
        let token = token.clone();
        async move { common::generate(&app, &token, EXAMPLE).await }
    });

    // Wait until the first request holds the in-flight slot.
    tokio::time::timeout(Duration::from_secs(5), async {
        while !state.in_flight.is_generating(user_id) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first generation should start");

    let second = common::generate(&app, &token, "Another command").await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "CONFLICT");

    generator.release.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert!(!state.in_flight.is_generating(user_id));

    let history = body_json(get_auth(app, "/api/plans", &token).await).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Quota
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sixth_free_plan_in_a_month_is_rejected() {
    let app = common::build_test_app(common::test_state());
    let (_, token) = common::register(&app, "quota@example.com").await;

    for i in 0..5 {
        let response = common::generate(&app, &token, &format!("Plan number {i}")).await;
        assert_eq!(response.status(), StatusCode::OK, "plan {i} should succeed");
    }

    let usage = body_json(get_auth(app.clone(), "/api/usage", &token).await).await;
    assert_eq!(usage["tier"], "free");
    assert_eq!(usage["used"], 5);
    assert_eq!(usage["limit"], 5);
    assert_eq!(usage["remaining"], 0);

    let sixth = common::generate(&app, &token, "One too many").await;
    assert_eq!(sixth.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(sixth).await;
    assert_eq!(json["code"], "QUOTA_EXCEEDED");
    assert!(json["error"].as_str().unwrap().contains("(5/5)"));

    let history = body_json(get_auth(app, "/api/plans", &token).await).await;
    assert_eq!(history.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn paid_tier_is_not_limited() {
    let state = common::test_state();
    let app = common::build_test_app(state.clone());
    let (user_id, token) = common::register(&app, "pro@example.com").await;
    UserRepo::update_tier(&state.pool, user_id, SubscriptionTier::Pro)
        .await
        .unwrap();

    for i in 0..7 {
        let response = common::generate(&app, &token, &format!("Pro plan {i}")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let usage = body_json(get_auth(app, "/api/usage", &token).await).await;
    assert_eq!(usage["tier"], "pro");
    assert_eq!(usage["used"], 7);
    assert!(usage["limit"].is_null());
    assert!(usage["remaining"].is_null());
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_is_private_and_ordered() {
    let app = common::build_test_app(common::test_state());
    let (_, alice) = common::register(&app, "alice@example.com").await;
    let (_, bob) = common::register(&app, "bob@example.com").await;

    let first = body_json(common::generate(&app, &alice, "First plan").await).await;
    let second = body_json(common::generate(&app, &alice, "Second plan").await).await;

    let history = body_json(get_auth(app.clone(), "/api/plans", &alice).await).await;
    let ids: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].clone())
        .collect();
    assert_eq!(ids, vec![first["id"].clone(), second["id"].clone()]);

    let bobs = body_json(get_auth(app.clone(), "/api/plans", &bob).await).await;
    assert!(bobs.as_array().unwrap().is_empty());

    let uri = format!("/api/plans/{}", first["id"].as_str().unwrap());
    let own = get_auth(app.clone(), &uri, &alice).await;
    assert_eq!(own.status(), StatusCode::OK);
    assert_eq!(body_json(own).await["title"], "First plan");

    let other = get_auth(app.clone(), &uri, &bob).await;
    assert_eq!(other.status(), StatusCode::NOT_FOUND);

    let malformed = get_auth(app.clone(), "/api/plans/not-a-uuid", &alice).await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let anonymous = get(app, "/api/plans").await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}
