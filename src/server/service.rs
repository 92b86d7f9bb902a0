//! HTTP service implementation.
//!
//! Routes are grouped the way they are secured:
//! - public: health, cache stats, credential diagnostics
//! - free tier: limited per client id, never bypasses the cache
//! - bearer: full guidance requests and cache maintenance

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use super::auth::{Authenticator, bearer_token};
use crate::cache::CacheStats;
use crate::quota::{FreeTierLimiter, UsageStatus};
use crate::rewards::query_reward;
use crate::types::{GuidanceRequest, GuidanceResponse, Language};
use crate::{AdvocateError, GuidancePipeline, Result};

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Application state shared across handlers.
pub struct AppState {
    pipeline: Arc<GuidancePipeline>,
    limiter: FreeTierLimiter,
    authenticator: Arc<dyn Authenticator>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(
        pipeline: Arc<GuidancePipeline>,
        limiter: FreeTierLimiter,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            pipeline,
            limiter,
            authenticator,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound the time spent answering one request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        self.authenticator.authenticate(bearer_token(headers)?)
    }

    async fn answer(&self, request: &GuidanceRequest) -> Result<GuidanceResponse> {
        tokio::time::timeout(self.request_timeout, self.pipeline.answer(request))
            .await
            .map_err(|_| AdvocateError::Timeout(self.request_timeout))?
    }
}

type AppStateArc = Arc<AppState>;

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/guidance", post(guidance))
        .route("/v1/free/guidance", post(free_guidance))
        .route("/v1/free/status", post(free_status))
        .route("/v1/cache/stats", get(cache_stats))
        .route("/v1/cache/clear", post(clear_cache))
        .route("/v1/cache/clear-expired", post(clear_expired))
        .route("/v1/debug/credentials", get(debug_credentials))
        .with_state(Arc::new(state))
}

// ============================================================================
// Errors
// ============================================================================

/// Error response body: `{"error": message}`.
pub struct ApiError(AdvocateError);

impl From<AdvocateError> for ApiError {
    fn from(err: AdvocateError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AdvocateError::InvalidInput(rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AdvocateError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AdvocateError::QuotaReached { .. } => StatusCode::TOO_MANY_REQUESTS,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// ============================================================================
// Public routes
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: String,
    credentials_configured: usize,
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::version_string(),
        credentials_configured: state
            .pipeline
            .orchestrator()
            .map_or(0, |o| o.rotator().len()),
    })
}

async fn cache_stats(State(state): State<AppStateArc>) -> Json<CacheStats> {
    Json(state.pipeline.cache().stats())
}

#[derive(Serialize)]
struct CredentialDiagnostics {
    count: usize,
    /// 1-based ordinal of the credential tried first on the next miss.
    current: Option<usize>,
    credentials: Vec<String>,
}

async fn debug_credentials(State(state): State<AppStateArc>) -> Json<CredentialDiagnostics> {
    let diagnostics = match state.pipeline.orchestrator() {
        Some(orchestrator) => {
            let rotator = orchestrator.rotator();
            CredentialDiagnostics {
                count: rotator.len(),
                current: Some(rotator.current().ordinal()),
                credentials: rotator.masked(),
            }
        }
        None => CredentialDiagnostics {
            count: 0,
            current: None,
            credentials: Vec::new(),
        },
    };
    Json(diagnostics)
}

// ============================================================================
// Free tier
// ============================================================================

#[derive(Deserialize)]
struct FreeGuidanceBody {
    client_id: String,
    issue: String,
    #[serde(default)]
    language: Language,
    #[serde(default)]
    summarize: bool,
}

#[derive(Serialize)]
struct FreeGuidanceResponse {
    #[serde(flatten)]
    response: GuidanceResponse,
    usage: UsageStatus,
}

async fn free_guidance(
    State(state): State<AppStateArc>,
    body: std::result::Result<Json<FreeGuidanceBody>, JsonRejection>,
) -> ApiResult<FreeGuidanceResponse> {
    let Json(body) = body?;
    state.limiter.validate_issue(&body.issue)?;
    state.limiter.check(&body.client_id)?;

    let request = GuidanceRequest::new(body.issue)
        .language(body.language)
        .summarize(body.summarize);
    let response = state.answer(&request).await?;
    let usage = state.limiter.record_success(&body.client_id)?;
    info!(
        client_id = %body.client_id,
        used = usage.used,
        from_cache = response.from_cache,
        "free tier request served"
    );

    Ok(Json(FreeGuidanceResponse { response, usage }))
}

#[derive(Deserialize)]
struct FreeStatusBody {
    client_id: String,
}

async fn free_status(
    State(state): State<AppStateArc>,
    body: std::result::Result<Json<FreeStatusBody>, JsonRejection>,
) -> ApiResult<UsageStatus> {
    let Json(body) = body?;
    Ok(Json(state.limiter.status(&body.client_id)?))
}

// ============================================================================
// Authenticated routes
// ============================================================================

#[derive(Deserialize)]
struct GuidanceBody {
    #[serde(flatten)]
    request: GuidanceRequest,
    #[serde(default)]
    voice_used: bool,
}

#[derive(Serialize)]
struct GuidanceEnvelope {
    #[serde(flatten)]
    response: GuidanceResponse,
    xp_reward: u32,
}

async fn guidance(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    body: std::result::Result<Json<GuidanceBody>, JsonRejection>,
) -> ApiResult<GuidanceEnvelope> {
    state.authorize(&headers)?;
    let Json(body) = body?;

    let response = state.answer(&body.request).await?;
    let xp_reward = query_reward(
        response.from_cache,
        body.request.summarize,
        body.voice_used,
    );
    Ok(Json(GuidanceEnvelope {
        response,
        xp_reward,
    }))
}

#[derive(Serialize)]
struct ClearResponse {
    removed: u64,
}

async fn clear_cache(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> ApiResult<ClearResponse> {
    state.authorize(&headers)?;
    let removed = state.pipeline.cache().clear_all().await;
    Ok(Json(ClearResponse { removed }))
}

async fn clear_expired(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> ApiResult<ClearResponse> {
    state.authorize(&headers)?;
    let removed = state.pipeline.cache().clear_expired().await;
    Ok(Json(ClearResponse { removed }))
}
