//! Structural validation of generated edit plans.
//!
//! Hard violations (inverted scene bounds, empty captions, bad durations,
//! duplicate ids) are errors. Suspicious but legal shapes are reported as
//! [`PlanWarning`]s so callers can flag them without rejecting the plan.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::plan::EditPlan;

/// Non-fatal findings about a structurally valid plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// The plan has no scenes (degenerate plan).
    NoScenes,
    /// Two consecutive scenes share part of the timeline.
    OverlappingScenes { first: String, second: String },
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub warnings: Vec<PlanWarning>,
}

impl PlanReport {
    pub fn is_degenerate(&self) -> bool {
        self.warnings.contains(&PlanWarning::NoScenes)
    }
}

/// Validate a plan, returning its warnings or the first hard violation.
pub fn validate_plan(plan: &EditPlan) -> Result<PlanReport, CoreError> {
    if plan.title.trim().is_empty() {
        return Err(CoreError::Validation("Plan title must not be empty".into()));
    }

    for scene in &plan.scenes {
        if scene.start_time >= scene.end_time {
            return Err(CoreError::Validation(format!(
                "Scene '{}' must start before it ends ({} >= {})",
                scene.id, scene.start_time, scene.end_time
            )));
        }
    }
    ensure_unique_ids("scene", plan.scenes.iter().map(|s| s.id.as_str()))?;

    for caption in &plan.captions {
        if caption.text.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Caption '{}' has empty text",
                caption.id
            )));
        }
        validate_duration("caption", &caption.id, caption.duration)?;
    }
    ensure_unique_ids("caption", plan.captions.iter().map(|c| c.id.as_str()))?;

    for anim in &plan.animations {
        validate_duration("animation", &anim.id, anim.duration)?;
    }
    ensure_unique_ids("animation", plan.animations.iter().map(|a| a.id.as_str()))?;

    for transition in plan.transitions() {
        validate_duration("transition", &transition.id, transition.duration)?;
    }
    ensure_unique_ids("transition", plan.transitions().iter().map(|t| t.id.as_str()))?;

    let mut report = PlanReport::default();
    if plan.scenes.is_empty() {
        report.warnings.push(PlanWarning::NoScenes);
    }
    for pair in plan.scenes.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.start_time < a.end_time && a.start_time < b.end_time {
            report.warnings.push(PlanWarning::OverlappingScenes {
                first: a.id.clone(),
                second: b.id.clone(),
            });
        }
    }
    Ok(report)
}

fn validate_duration(entity: &str, id: &str, duration: f64) -> Result<(), CoreError> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{entity} '{id}' must have a positive duration, got {duration}"
        )));
    }
    Ok(())
}

fn ensure_unique_ids<'a>(
    entity: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!("Duplicate {entity} id '{id}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Animation, Caption, Scene, SceneAction, Transition};
    use crate::timecode::Timecode;
    use assert_matches::assert_matches;

    fn scene(id: &str, start: u64, end: u64) -> Scene {
        Scene {
            id: id.into(),
            start_time: Timecode::from_secs(start),
            end_time: Timecode::from_secs(end),
            action: SceneAction::Keep,
            reason: None,
        }
    }

    fn plan() -> EditPlan {
        EditPlan::new("Test", chrono::Utc::now())
    }

    #[test]
    fn empty_plan_is_valid_but_degenerate() {
        let report = validate_plan(&plan()).unwrap();
        assert!(report.is_degenerate());
        assert_eq!(report.warnings, vec![PlanWarning::NoScenes]);
    }

    #[test]
    fn well_formed_plan_has_no_warnings() {
        let mut p = plan();
        p.scenes = vec![scene("s1", 0, 5), scene("s2", 5, 9)];
        let report = validate_plan(&p).unwrap();
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn rejects_inverted_and_zero_length_scenes() {
        let mut p = plan();
        p.scenes = vec![scene("s1", 8, 3)];
        assert_matches!(validate_plan(&p), Err(CoreError::Validation(_)));

        p.scenes = vec![scene("s1", 4, 4)];
        assert_matches!(validate_plan(&p), Err(CoreError::Validation(_)));
    }

    #[test]
    fn flags_overlapping_neighbours() {
        let mut p = plan();
        p.scenes = vec![scene("s1", 0, 10), scene("s2", 8, 12)];
        let report = validate_plan(&p).unwrap();
        assert_eq!(
            report.warnings,
            vec![PlanWarning::OverlappingScenes {
                first: "s1".into(),
                second: "s2".into()
            }]
        );
    }

    #[test]
    fn rejects_blank_caption_text() {
        let mut p = plan();
        p.captions.push(Caption {
            id: "c1".into(),
            text: "   ".into(),
            time: Timecode::ZERO,
            duration: 1.0,
            style: "default".into(),
        });
        assert_matches!(validate_plan(&p), Err(CoreError::Validation(msg)) if msg.contains("empty text"));
    }

    #[test]
    fn rejects_non_positive_or_nan_durations() {
        let mut p = plan();
        p.animations.push(Animation {
            id: "a1".into(),
            kind: "zoom".into(),
            duration: 0.0,
            timing: "start".into(),
        });
        assert_matches!(validate_plan(&p), Err(CoreError::Validation(_)));

        let mut p = plan();
        p.transitions = Some(vec![Transition {
            id: "t1".into(),
            kind: "fade".into(),
            duration: f64::NAN,
        }]);
        assert_matches!(validate_plan(&p), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut p = plan();
        p.scenes = vec![scene("s1", 0, 2), scene("s1", 3, 4)];
        assert_matches!(validate_plan(&p), Err(CoreError::Validation(msg)) if msg.contains("Duplicate scene"));
    }

    #[test]
    fn rejects_blank_title() {
        let mut p = plan();
        p.title = " ".into();
        assert_matches!(validate_plan(&p), Err(CoreError::Validation(_)));
    }
}
