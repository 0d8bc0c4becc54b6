//! Client for the external report generator.

use bytes::Bytes;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::error::ServiceError;
use crate::payload::AssessmentPayload;
use crate::services::truncate_body;

/// Default base URL for a locally running report service.
pub const DEFAULT_REPORT_URL: &str = "http://127.0.0.1:5000";

/// A downloadable artifact as returned by the report service.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    /// The raw document bytes, opaque to this crate.
    pub bytes: Bytes,
    /// Content type reported by the service.
    pub content_type: String,
    /// Suggested download filename, dated at request time.
    pub filename: String,
}

/// HTTP client for the report collaborator.
///
/// Sends the assembled payload together with the previously received
/// analysis result and returns the binary artifact unparsed.
#[derive(Debug, Clone)]
pub struct ReportClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReportClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from the `REPORT_URL` environment variable, falling
    /// back to [`DEFAULT_REPORT_URL`].
    pub fn from_env() -> Self {
        Self::new(std::env::var("REPORT_URL").unwrap_or_else(|_| DEFAULT_REPORT_URL.to_string()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a rendered report. `analysis` is the cached analysis
    /// response, forwarded verbatim — nothing is re-derived from it.
    pub async fn render(
        &self,
        payload: &AssessmentPayload,
        analysis: &Value,
    ) -> Result<ReportArtifact, ServiceError> {
        let endpoint = format!("{}/api/download", self.base_url);
        log::debug!(
            "ReportClient.render: endpoint={}, traits={}",
            endpoint,
            payload.selected_traits.len(),
        );

        let body = serde_json::json!({
            "selectedTraits": payload.selected_traits,
            "answers": payload.answers,
            "traitData": payload.trait_data,
            "patterns": payload.patterns,
            "analysis": analysis,
        });

        let response = self
            .http
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/pdf")
            .to_string();
        let bytes = response.bytes().await?;

        Ok(ReportArtifact {
            bytes,
            content_type,
            filename: default_filename(),
        })
    }
}

/// Download name in the `personality-assessment-YYYY-MM-DD.pdf` convention.
fn default_filename() -> String {
    format!("personality-assessment-{}.pdf", Utc::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filename_shape() {
        let name = default_filename();
        assert!(name.starts_with("personality-assessment-"));
        assert!(name.ends_with(".pdf"));
        // personality-assessment- + YYYY-MM-DD + .pdf
        assert_eq!(name.len(), "personality-assessment-".len() + 10 + 4);
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = ReportClient::new("http://example.test///");
        assert_eq!(client.base_url(), "http://example.test");
    }
}
