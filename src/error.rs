//! Advocate error types

use std::time::Duration;

/// How a failed provider attempt should steer the fallback sequence.
///
/// Model-scoped kinds move on to the next model under the same credential;
/// credential-scoped kinds abandon the credential and rotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The model does not exist for this credential.
    NotFound,
    /// Quota, rate limit, or resource exhaustion on the credential.
    QuotaExhausted,
    /// The credential was rejected.
    InvalidCredential,
    /// Anything else, including empty or malformed replies.
    Transient,
}

impl FailureKind {
    /// Whether this failure should abandon the current credential.
    pub fn is_credential_scoped(self) -> bool {
        matches!(self, Self::QuotaExhausted | Self::InvalidCredential)
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::QuotaExhausted => "quota_exhausted",
            Self::InvalidCredential => "invalid_credential",
            Self::Transient => "transient",
        }
    }
}

/// Advocate error types
#[derive(Debug, thiserror::Error)]
pub enum AdvocateError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Unstructured provider failure; classified by message content.
    #[error("provider error: {0}")]
    Provider(String),

    #[error("empty response from model")]
    EmptyResponse,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Client errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("daily limit reached ({limit} queries/day), resets in {reset_in_hours:.1} hours")]
    QuotaReached { limit: u32, reset_in_hours: f64 },

    // Configuration errors
    #[error("no provider credentials configured")]
    NoCredentials,

    #[error("configuration error: {0}")]
    Configuration(String),

    /// Every credential and every model failed for this request.
    #[error("all provider credentials exhausted; last error: {}", last_error.as_deref().unwrap_or("none"))]
    ProvidersExhausted { last_error: Option<String> },
}

impl AdvocateError {
    /// Classify a provider failure into the kind that drives fallback.
    ///
    /// Structured variants map directly. Unstructured messages fall back
    /// to [`classify_message`].
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::ModelNotFound(_) => FailureKind::NotFound,
            Self::RateLimited { .. } => FailureKind::QuotaExhausted,
            Self::AuthenticationFailed(_) => FailureKind::InvalidCredential,
            Self::Api { status: 404, .. } => FailureKind::NotFound,
            Self::Api { status: 429, .. } => FailureKind::QuotaExhausted,
            Self::Api {
                status: 401 | 403, ..
            } => FailureKind::InvalidCredential,
            Self::Provider(msg) => classify_message(msg),
            _ => FailureKind::Transient,
        }
    }

    /// Errors caused by the caller's request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Json(_))
    }
}

/// Classify a raw provider error message.
///
/// Only used when the provider gave no structured status. Not-found wins
/// over quota, quota over credential problems.
pub fn classify_message(message: &str) -> FailureKind {
    let upper = message.to_uppercase();
    if upper.contains("404") || upper.contains("NOT FOUND") || upper.contains("NOT_FOUND") {
        FailureKind::NotFound
    } else if upper.contains("QUOTA")
        || upper.contains("LIMIT")
        || upper.contains("RESOURCE_EXHAUSTED")
        || upper.contains("429")
    {
        FailureKind::QuotaExhausted
    } else if upper.contains("API_KEY") || upper.contains("INVALID") {
        FailureKind::InvalidCredential
    } else {
        FailureKind::Transient
    }
}

/// Result type alias for Advocate operations
pub type Result<T> = std::result::Result<T, AdvocateError>;
