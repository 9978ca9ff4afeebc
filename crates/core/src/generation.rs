//! Plan generation contract and the built-in rule-based generator.
//!
//! A [`PlanGenerator`] turns one validated [`Command`] into one [`EditPlan`].
//! Quota enforcement happens before the generator is called; generator
//! implementations only report [`CoreError::GenerationFailed`] for upstream
//! failures.
//!
//! [`RuleBasedGenerator`] is a deterministic keyword matcher so the service
//! works end to end without a model behind it.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::command::Command;
use crate::error::CoreError;
use crate::plan::{Animation, Caption, EditPlan, Scene, SceneAction, Transition};
use crate::quota::SubscriptionTier;
use crate::timecode::Timecode;
use crate::types::{DbId, Timestamp};

/// Maximum title length derived from a command, in characters.
pub const MAX_TITLE_CHARS: usize = 60;

/// Default on-screen duration for generated captions, in seconds.
pub const DEFAULT_CAPTION_SECS: f64 = 3.0;
/// Default duration for generated animations, in seconds.
pub const DEFAULT_ANIMATION_SECS: f64 = 3.0;
/// Duration of the quick cut used for "energetic" edits, in seconds.
pub const QUICK_CUT_SECS: f64 = 0.2;
/// Duration of a fade transition, in seconds.
pub const FADE_SECS: f64 = 1.0;

const TIMECODE_PATTERN: &str = r"\d+(?::\d{1,2}){0,2}(?:\.\d{1,3})?";

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bfrom\s+({TIMECODE_PATTERN})\s+(?:to|until)\s+({TIMECODE_PATTERN})"
    ))
    .expect("valid regex")
});

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|“([^”]+)”"#).expect("valid regex"));

/// Style words recognised in caption requests, in output order.
const STYLE_WORDS: &[&str] = &[
    "bold", "italic", "large", "small", "yellow", "white", "red", "blue", "green", "black",
];

/// Keyword to animation type mapping; first match wins.
const ANIMATION_KINDS: &[(&str, &str)] = &[
    ("flight", "flight-path"),
    ("map", "map-route"),
    ("zoom", "zoom"),
    ("slide", "slide-in"),
    ("text", "kinetic-text"),
];

const DEFAULT_ANIMATION_KIND: &str = "motion-graphic";

/// Input to a generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub command: Command,
    pub user_id: DbId,
    pub tier: SubscriptionTier,
}

/// Maps a command to a structured edit plan.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<EditPlan, CoreError>;
}

/// Deterministic keyword-driven generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedGenerator;

impl RuleBasedGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build a plan for `command` stamped with `now`.
    pub fn plan_for(&self, command: &Command, now: Timestamp) -> Result<EditPlan, CoreError> {
        let text = command.as_str();
        let lower = text.to_lowercase();
        let mut plan = EditPlan::new(derive_title(text), now);

        plan.scenes = extract_scenes(text)?;

        if lower.contains("caption") || lower.contains("subtitle") {
            let anchor = plan
                .scenes
                .first()
                .map(|s| s.start_time)
                .unwrap_or(Timecode::ZERO);
            plan.captions.push(Caption {
                id: "caption-1".into(),
                text: quoted_text(text).unwrap_or_else(|| "Dialogue".into()),
                time: anchor,
                duration: DEFAULT_CAPTION_SECS,
                style: caption_style(&lower),
            });
        }

        if lower.contains("animation") || lower.contains("animate") {
            let kind = ANIMATION_KINDS
                .iter()
                .find(|(keyword, _)| lower.contains(keyword))
                .map(|(_, kind)| *kind)
                .unwrap_or(DEFAULT_ANIMATION_KIND);
            plan.animations.push(Animation {
                id: "animation-1".into(),
                kind: kind.into(),
                duration: DEFAULT_ANIMATION_SECS,
                timing: "start".into(),
            });
        }

        let mut transitions = Vec::new();
        if lower.contains("energetic") || lower.contains("fast cut") {
            transitions.push(Transition {
                id: format!("transition-{}", transitions.len() + 1),
                kind: "quick-cut".into(),
                duration: QUICK_CUT_SECS,
            });
        }
        if lower.contains("fade") {
            transitions.push(Transition {
                id: format!("transition-{}", transitions.len() + 1),
                kind: "fade".into(),
                duration: FADE_SECS,
            });
        }
        if !transitions.is_empty() {
            plan.transitions = Some(transitions);
        }

        Ok(plan)
    }
}

#[async_trait]
impl PlanGenerator for RuleBasedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<EditPlan, CoreError> {
        let plan = self.plan_for(&request.command, chrono::Utc::now())?;
        tracing::debug!(
            user_id = request.user_id,
            plan_id = %plan.id,
            scenes = plan.scenes.len(),
            captions = plan.captions.len(),
            animations = plan.animations.len(),
            "Rule-based plan generated"
        );
        Ok(plan)
    }
}

/// First [`MAX_TITLE_CHARS`] characters of the command, with an ellipsis
/// when truncated.
pub fn derive_title(command: &str) -> String {
    let collapsed = collapse_whitespace(command);
    let trimmed = collapsed.as_str();
    if trimmed.chars().count() <= MAX_TITLE_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(MAX_TITLE_CHARS).collect();
    format!("{}…", head.trim_end())
}

fn extract_scenes(text: &str) -> Result<Vec<Scene>, CoreError> {
    let mut scenes = Vec::new();
    let mut clause_start = 0;

    for caps in RANGE_RE.captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 is the whole match");
        let start = parse_timecode(&caps[1])?;
        let end = parse_timecode(&caps[2])?;
        if start >= end {
            return Err(CoreError::GenerationFailed(format!(
                "Requested range {start} to {end} does not move forward in time"
            )));
        }

        // The verb governing a range is whatever precedes it since the
        // previous range.
        let clause = &text[clause_start..whole.start()];
        let request = format!(
            "{}{}",
            clause.trim_start_matches([',', ';', ' ']),
            whole.as_str()
        );
        scenes.push(Scene {
            id: format!("scene-{}", scenes.len() + 1),
            start_time: start,
            end_time: end,
            action: action_for(clause),
            reason: Some(collapse_whitespace(&request)),
        });
        clause_start = whole.end();
    }
    Ok(scenes)
}

/// Single-line form of `text`: runs of whitespace, line breaks included,
/// become one space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_timecode(raw: &str) -> Result<Timecode, CoreError> {
    Timecode::parse(raw)
        .map_err(|e| CoreError::GenerationFailed(format!("Could not read timecode: {e}")))
}

fn action_for(clause: &str) -> SceneAction {
    let lower = clause.to_lowercase();
    if ["cut", "remove", "delete", "trim", "drop"]
        .iter()
        .any(|verb| has_word(&lower, verb))
    {
        SceneAction::Cut
    } else if has_word(&lower, "keep") {
        SceneAction::Keep
    } else {
        SceneAction::Modify
    }
}

fn caption_style(lower: &str) -> String {
    let words: Vec<&str> = STYLE_WORDS
        .iter()
        .copied()
        .filter(|w| has_word(lower, w))
        .collect();
    if words.is_empty() {
        "default".into()
    } else {
        words.join("-")
    }
}

fn has_word(lower: &str, word: &str) -> bool {
    lower.split(|c: char| !c.is_alphanumeric()).any(|t| t == word)
}

fn quoted_text(text: &str) -> Option<String> {
    QUOTED_RE.captures(text).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| collapse_whitespace(m.as_str()))
            .filter(|s| !s.is_empty())
    })
}
