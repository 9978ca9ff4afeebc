//! Plan exporters.
//!
//! [`ExportFormat`] selects one exporter per variant; each returns an
//! [`ExportArtifact`] holding the rendered bytes plus the file name and
//! content type a download should use. Exporters are pure: delivering the
//! artifact (download, clipboard, HTTP body) is the caller's job.

pub mod json;
pub mod pdf;
pub mod text;

use serde::{Deserialize, Serialize};

use crate::plan::EditPlan;

/// Suffix appended to the plan title to form export file names.
pub const FILE_NAME_SUFFIX: &str = "-edit-plan";

/// Fallback file stem when the title sanitises to nothing.
const UNTITLED: &str = "untitled";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The format has no implementation yet.
    #[error("{0} export is not supported yet")]
    Unsupported(ExportFormat),

    /// The plan could not be encoded.
    #[error("could not serialize plan: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A remote exporter reported a failure.
    #[error("export failed: {0}")]
    Failed(String),
}

/// Target representation for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Text,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Json, ExportFormat::Text, ExportFormat::Pdf];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "text",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Text => "text/plain; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(crate::error::CoreError::Validation(format!(
                "Unknown export format '{other}'. Must be one of: json, text, pdf"
            ))),
        }
    }
}

/// A rendered export ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    fn new(plan: &EditPlan, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            format,
            file_name: export_file_name(&plan.title, format),
            content_type: format.content_type(),
            bytes,
        }
    }
}

/// Render `plan` in the requested format.
pub fn export_plan(plan: &EditPlan, format: ExportFormat) -> Result<ExportArtifact, ExportError> {
    let bytes = match format {
        ExportFormat::Json => json::render(plan)?.into_bytes(),
        ExportFormat::Text => text::render(plan).into_bytes(),
        ExportFormat::Pdf => pdf::render(plan)?,
    };
    tracing::debug!(plan_id = %plan.id, format = format.as_str(), bytes = bytes.len(), "Exported plan");
    Ok(ExportArtifact::new(plan, format, bytes))
}

/// `<title>-edit-plan.<ext>` with characters unsafe in file names replaced.
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | '\'' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = if stem.trim_matches('_').is_empty() {
        UNTITLED
    } else {
        stem.as_str()
    };
    format!("{stem}{FILE_NAME_SUFFIX}.{}", format.extension())
}
