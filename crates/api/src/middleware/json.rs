//! JSON body extractor whose rejections use the API error envelope.

use axum::extract::FromRequest;

use crate::error::AppError;

/// Drop-in for [`axum::Json`] on request bodies.
///
/// A missing content type, malformed JSON or a body of the wrong shape is
/// rejected as `400 BAD_REQUEST` with the usual `{error, code}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
