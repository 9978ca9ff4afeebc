//! Canonical JSON export.

use crate::plan::EditPlan;

use super::ExportError;

/// Pretty-printed JSON. The same plan always renders to the same bytes.
pub fn render(plan: &EditPlan) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(plan)?)
}

/// Parse a JSON export back into a plan.
pub fn parse(input: &str) -> Result<EditPlan, ExportError> {
    Ok(serde_json::from_str(input)?)
}
