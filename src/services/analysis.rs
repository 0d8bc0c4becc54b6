//! Client for the external analysis service.

use serde_json::Value;

use crate::error::ServiceError;
use crate::payload::AssessmentPayload;
use crate::services::truncate_body;

/// Default base URL for a locally running analysis service.
pub const DEFAULT_ANALYSIS_URL: &str = "http://127.0.0.1:5000";

/// HTTP client for the analysis collaborator.
///
/// Posts an assembled [`AssessmentPayload`] and returns the service's
/// response as opaque JSON. No interpretation of the result happens here.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from the `ANALYSIS_URL` environment variable,
    /// falling back to [`DEFAULT_ANALYSIS_URL`].
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("ANALYSIS_URL").unwrap_or_else(|_| DEFAULT_ANALYSIS_URL.to_string()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit the payload for analysis. Single request; failures surface
    /// immediately and are never retried here.
    pub async fn analyze(&self, payload: &AssessmentPayload) -> Result<Value, ServiceError> {
        let endpoint = format!("{}/api/analyze", self.base_url);
        log::debug!(
            "AnalysisClient.analyze: endpoint={}, traits={}",
            endpoint,
            payload.selected_traits.len(),
        );

        let response = self
            .http
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse {
            message: format!("{} - Body: {}", e, truncate_body(&body)),
        })
    }
}
