//! REST API client for the EditAI HTTP endpoints.

use std::sync::RwLock;

use async_trait::async_trait;
use editai_core::command::Command;
use editai_core::error::CoreError;
use editai_core::export::ExportFormat;
use editai_core::plan::EditPlan;
use editai_core::quota::SubscriptionTier;
use editai_core::session::PlanBackend;
use editai_core::types::{DbId, Timestamp};
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ClientError, ErrorBody};

/// HTTP client for one EditAI API server.
///
/// Holds the access token from the last successful `register` or `login`.
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
    token: RwLock<Option<String>>,
}

/// Response of `register` and `login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub subscription_tier: SubscriptionTier,
}

/// Quota usage for the current billing month.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UsageReport {
    pub tier: SubscriptionTier,
    pub used: u32,
    /// `None` for unlimited tiers.
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
}

/// A downloaded export.
#[derive(Debug, Clone)]
pub struct ExportDownload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://localhost:5000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    /// Use an access token obtained elsewhere.
    pub fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_ok()
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        Self::parse_response(response).await
    }

    /// `POST /api/auth/register`; keeps the returned token.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await?;
        let auth: AuthResponse = Self::parse_response(response).await?;
        self.set_token(Some(auth.access_token.clone()));
        Ok(auth)
    }

    /// `POST /api/auth/login`; keeps the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&body)
            .send()
            .await?;
        let auth: AuthResponse = Self::parse_response(response).await?;
        self.set_token(Some(auth.access_token.clone()));
        Ok(auth)
    }

    /// `GET /api/auth/me`.
    pub async fn me(&self) -> Result<UserInfo, ClientError> {
        let response = self.authed_get("/api/auth/me")?.send().await?;
        Self::parse_response(response).await
    }

    /// `POST /api/plans/generate`.
    pub async fn generate_plan(&self, command: &str) -> Result<EditPlan, ClientError> {
        let token = self.token()?;
        let response = self
            .client
            .post(self.url("/api/plans/generate"))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .json(&serde_json::json!({ "command": command }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /api/plans`, oldest first.
    pub async fn list_plans(&self) -> Result<Vec<EditPlan>, ClientError> {
        let response = self.authed_get("/api/plans")?.send().await?;
        Self::parse_response(response).await
    }

    /// `GET /api/plans/{id}`.
    pub async fn get_plan(&self, id: Uuid) -> Result<EditPlan, ClientError> {
        let response = self.authed_get(&format!("/api/plans/{id}"))?.send().await?;
        Self::parse_response(response).await
    }

    /// `GET /api/usage`.
    pub async fn usage(&self) -> Result<UsageReport, ClientError> {
        let response = self.authed_get("/api/usage")?.send().await?;
        Self::parse_response(response).await
    }

    /// `GET /api/plans/{id}/export?format=...`.
    pub async fn export_plan(
        &self,
        id: Uuid,
        format: ExportFormat,
    ) -> Result<ExportDownload, ClientError> {
        let response = self
            .authed_get(&format!("/api/plans/{id}/export"))?
            .query(&[("format", format.as_str())])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let header = |name| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let file_name = header(CONTENT_DISPOSITION).and_then(|v| attachment_file_name(&v));
        let content_type = header(CONTENT_TYPE);
        let bytes = response.bytes().await?.to_vec();

        Ok(ExportDownload {
            file_name,
            content_type,
            bytes,
        })
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn token(&self) -> Result<String, ClientError> {
        let guard = match self.token.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone().ok_or(ClientError::NotAuthenticated)
    }

    fn authed_get(&self, path: &str) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.token()?;
        Ok(self
            .client
            .get(self.url(path))
            .header(AUTHORIZATION, format!("Bearer {token}")))
    }

    /// Ensure the response has a success status code. On failure the
    /// `{error, code}` body is decoded when possible, otherwise the raw
    /// text is kept.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => (Some(parsed.code), parsed.error),
            Err(_) => (None, body),
        };
        tracing::debug!(status = status.as_u16(), code = ?code, "EditAI API returned an error");
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PlanBackend for ApiClient {
    async fn generate(&self, command: &Command) -> Result<EditPlan, CoreError> {
        match self.generate_plan(command.as_str()).await {
            Ok(plan) => Ok(plan),
            Err(err) if err.code() == Some("QUOTA_EXCEEDED") => {
                // The error body has no counts; fill them from /usage.
                match self.usage().await {
                    Ok(usage) => Err(CoreError::QuotaExceeded {
                        limit: usage.limit.unwrap_or(usage.used),
                        used: usage.used,
                    }),
                    Err(usage_err) => {
                        tracing::warn!(error = %usage_err, "Could not load usage after quota error");
                        Err(CoreError::QuotaExceeded { limit: 0, used: 0 })
                    }
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch_plans(&self) -> Result<Vec<EditPlan>, CoreError> {
        Ok(self.list_plans().await?)
    }
}

/// File name from a `Content-Disposition` header, preferring the RFC 5987
/// `filename*` form.
fn attachment_file_name(header: &str) -> Option<String> {
    let params = header.split(';').map(str::trim);
    let mut plain = None;
    for param in params {
        if let Some(encoded) = param.strip_prefix("filename*=UTF-8''") {
            if let Ok(decoded) = urlencoding::decode(encoded) {
                return Some(decoded.into_owned());
            }
        } else if let Some(quoted) = param.strip_prefix("filename=") {
            plain = Some(quoted.trim_matches('"').to_string());
        }
    }
    plain
}
