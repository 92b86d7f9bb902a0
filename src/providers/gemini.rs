//! Google Gemini `generateContent` client.
//!
//! One request per [`TextProvider::attempt`]. The API key travels in the
//! `x-goog-api-key` header, never in the URL, so it cannot leak into
//! request logs.
//! See: <https://ai.google.dev/api/generate-content>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::credentials::Credential;
use super::traits::TextProvider;
use crate::{AdvocateError, Result};

/// Default base URL for the Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the Gemini Generative Language API.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
}

impl GeminiClient {
    /// Create a client against the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_options(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL and request timeout.
    pub fn with_options(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Generate content for a single text prompt.
    ///
    /// Returns the concatenated text parts of the first candidate, which
    /// may be empty if the model produced no text.
    pub async fn generate_content(
        &self,
        prompt: &str,
        api_key: &str,
        model: &str,
    ) -> Result<String> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&GenerateRequest {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            })
            .send()
            .await
            .map_err(|e| AdvocateError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            return Err(map_error(status, &body, model, retry_after));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AdvocateError::Http(e.to_string()))?;

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or(AdvocateError::EmptyResponse)?;

        Ok(candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default())
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a non-success response to a structured error.
///
/// Prefers the API's `error.status` and `ErrorInfo.reason` over the HTTP
/// code, since Gemini reports bad keys as 400 `INVALID_ARGUMENT`.
fn map_error(
    status: StatusCode,
    body: &str,
    model: &str,
    retry_after: Option<Duration>,
) -> AdvocateError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error)
        .unwrap_or_default();
    let message = detail
        .message
        .clone()
        .unwrap_or_else(|| format!("Gemini API error: {status}"));
    let api_status = detail.status.as_deref().unwrap_or_default();
    let key_rejected = detail
        .details
        .iter()
        .any(|d| d.reason.as_deref().is_some_and(|r| r.starts_with("API_KEY")));

    match (status.as_u16(), api_status) {
        (404, _) | (_, "NOT_FOUND") => AdvocateError::ModelNotFound(model.to_string()),
        (429, _) | (_, "RESOURCE_EXHAUSTED") => AdvocateError::RateLimited { retry_after },
        (401 | 403, _) | (_, "UNAUTHENTICATED" | "PERMISSION_DENIED") => {
            AdvocateError::AuthenticationFailed(message)
        }
        (400, _) if key_rejected => AdvocateError::AuthenticationFailed(message),
        (code, _) => AdvocateError::Api {
            status: code,
            message,
        },
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize, Default)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorInfo>,
}

#[derive(Deserialize)]
struct ErrorInfo {
    #[serde(default)]
    reason: Option<String>,
}

// ============================================================================
// Provider Trait Implementation
// ============================================================================

#[async_trait]
impl TextProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn attempt(&self, prompt: &str, credential: &Credential, model: &str) -> Result<String> {
        self.generate_content(prompt, credential.secret(), model)
            .await
    }
}
