//! Edit plan data model.
//!
//! An [`EditPlan`] is produced atomically from one command and never mutated
//! afterwards. All child collections are owned by their plan; insertion
//! order of `scenes` is timeline order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timecode::Timecode;
use crate::types::Timestamp;

/// The root artifact produced by one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditPlan {
    pub id: Uuid,
    pub title: String,
    pub created_at: Timestamp,
    pub scenes: Vec<Scene>,
    pub captions: Vec<Caption>,
    pub animations: Vec<Animation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitions: Option<Vec<Transition>>,
}

impl EditPlan {
    /// Start an empty plan with a fresh id and the given creation time.
    pub fn new(title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at,
            scenes: Vec::new(),
            captions: Vec::new(),
            animations: Vec::new(),
            transitions: None,
        }
    }

    /// Transitions as a slice, empty when the plan carries none.
    pub fn transitions(&self) -> &[Transition] {
        self.transitions.as_deref().unwrap_or(&[])
    }

    /// A plan with no scenes is valid but says nothing about the timeline.
    pub fn is_degenerate(&self) -> bool {
        self.scenes.is_empty()
    }
}

/// Keep/cut/modify decision attached to a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SceneAction {
    Keep,
    Cut,
    Modify,
}

impl SceneAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneAction::Keep => "KEEP",
            SceneAction::Cut => "CUT",
            SceneAction::Modify => "MODIFY",
        }
    }
}

impl std::fmt::Display for SceneAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timeline interval with an associated decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub start_time: Timecode,
    pub end_time: Timecode,
    pub action: SceneAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Scene {
    /// Length of the interval, zero if the bounds are inverted.
    pub fn duration_ms(&self) -> u64 {
        self.end_time
            .as_millis()
            .saturating_sub(self.start_time.as_millis())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub id: String,
    pub text: String,
    pub time: Timecode,
    /// Seconds on screen.
    pub duration: f64,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Seconds.
    pub duration: f64,
    /// Placement, e.g. `start`, `end` or an offset.
    pub timing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Seconds.
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_plan() -> EditPlan {
        let created = chrono::Utc.with_ymd_and_hms(2026, 3, 4, 10, 30, 0).unwrap();
        let mut plan = EditPlan::new("Demo", created);
        plan.scenes.push(Scene {
            id: "scene-1".into(),
            start_time: Timecode::from_secs(12),
            end_time: Timecode::from_secs(18),
            action: SceneAction::Cut,
            reason: None,
        });
        plan.captions.push(Caption {
            id: "caption-1".into(),
            text: "Hello".into(),
            time: Timecode::from_secs(2),
            duration: 2.5,
            style: "bold-yellow".into(),
        });
        plan
    }

    #[test]
    fn scene_action_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&SceneAction::Cut).unwrap(), "\"CUT\"");
        let parsed: SceneAction = serde_json::from_str("\"MODIFY\"").unwrap();
        assert_eq!(parsed, SceneAction::Modify);
    }

    #[test]
    fn wire_shape_uses_contract_field_names() {
        let json = serde_json::to_value(sample_plan()).unwrap();
        assert_eq!(json["title"], "Demo");
        assert_eq!(json["scenes"][0]["start_time"], "0:12");
        assert_eq!(json["scenes"][0]["end_time"], "0:18");
        assert_eq!(json["scenes"][0]["action"], "CUT");
        assert!(json["scenes"][0].get("reason").is_none());
        assert_eq!(json["captions"][0]["style"], "bold-yellow");
        assert!(json.get("transitions").is_none());
    }

    #[test]
    fn animation_kind_is_named_type_on_the_wire() {
        let anim = Animation {
            id: "a1".into(),
            kind: "flight-path".into(),
            duration: 3.0,
            timing: "start".into(),
        };
        let json = serde_json::to_value(&anim).unwrap();
        assert_eq!(json["type"], "flight-path");
    }

    #[test]
    fn missing_transitions_deserialize_as_none() {
        let json = r#"{
            "id": "6f1c1c59-3c9a-4a4e-9b8e-6d2f0f7c1a11",
            "title": "Sample Edit Plan",
            "created_at": "2026-01-01T00:00:00Z",
            "scenes": [],
            "captions": [],
            "animations": []
        }"#;
        let plan: EditPlan = serde_json::from_str(json).unwrap();
        assert!(plan.transitions.is_none());
        assert!(plan.transitions().is_empty());
        assert!(plan.is_degenerate());
    }

    #[test]
    fn scene_duration_saturates() {
        let scene = Scene {
            id: "s".into(),
            start_time: Timecode::from_secs(5),
            end_time: Timecode::from_secs(3),
            action: SceneAction::Keep,
            reason: None,
        };
        assert_eq!(scene.duration_ms(), 0);
    }
}
