use crate::export::ExportError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Monthly plan quota exceeded: {used} of {limit} plans used")]
    QuotaExceeded { limit: u32, used: u32 },

    #[error("Plan generation failed: {0}")]
    GenerationFailed(String),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Generation was cancelled before its result arrived")]
    Cancelled,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the caller may retry the same request unchanged.
    ///
    /// Only upstream generation failures are transient; everything else
    /// needs different input, an upgrade, or a fresh session.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::GenerationFailed(_))
    }
}
