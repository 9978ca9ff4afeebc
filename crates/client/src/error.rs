use editai_core::error::CoreError;
use editai_core::export::{ExportError, ExportFormat};
use serde::Deserialize;

/// Errors from the EditAI REST client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("EditAI API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable `code` from the error body, when present.
        code: Option<String>,
        /// Human-readable `error` from the body, or the raw body.
        message: String,
    },

    /// An authenticated endpoint was called before `register`/`login`.
    #[error("Not signed in")]
    NotAuthenticated,
}

/// Error body shape shared by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
            ClientError::NotAuthenticated => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<ClientError> for CoreError {
    /// Map transport and API failures back onto domain errors.
    ///
    /// `QUOTA_EXCEEDED` carries no counts on the wire; it becomes
    /// `QuotaExceeded { limit: 0, used: 0 }` here and callers that need the
    /// numbers ask `/usage`.
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(e) => {
                CoreError::GenerationFailed(format!("Could not reach the EditAI API: {e}"))
            }
            ClientError::NotAuthenticated => CoreError::Unauthorized("Not signed in".into()),
            ClientError::Api {
                status,
                code,
                message,
            } => match code.as_deref() {
                Some("VALIDATION_ERROR") | Some("BAD_REQUEST") => CoreError::Validation(message),
                Some("QUOTA_EXCEEDED") => CoreError::QuotaExceeded { limit: 0, used: 0 },
                Some("GENERATION_FAILED") => CoreError::GenerationFailed(message),
                Some("UNAUTHORIZED") => CoreError::Unauthorized(message),
                Some("NOT_FOUND") => CoreError::NotFound {
                    entity: "EditPlan",
                    id: message,
                },
                Some("CONFLICT") => CoreError::Conflict(message),
                Some("CANCELLED") => CoreError::Cancelled,
                Some("EXPORT_UNSUPPORTED") => match unsupported_format(&message) {
                    Some(format) => CoreError::Export(ExportError::Unsupported(format)),
                    None => CoreError::Export(ExportError::Failed(message)),
                },
                Some("EXPORT_FAILED") => CoreError::Export(ExportError::Failed(message)),
                Some("INTERNAL_ERROR") => CoreError::Internal(message),
                _ if status >= 500 => CoreError::GenerationFailed(message),
                _ => CoreError::Internal(format!("Unexpected API response ({status}): {message}")),
            },
        }
    }
}

/// Format named by an `EXPORT_UNSUPPORTED` message (`"PDF export is ..."`).
fn unsupported_format(message: &str) -> Option<ExportFormat> {
    message.split_whitespace().next()?.parse().ok()
}
