//! PDF export.
//!
//! The contract is reserved: a paginated rendering of the same sections as
//! the text export. Until a renderer exists this reports
//! [`ExportError::Unsupported`] instead of producing an empty document.

use crate::plan::EditPlan;

use super::{ExportError, ExportFormat};

pub fn render(_plan: &EditPlan) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unsupported(ExportFormat::Pdf))
}
