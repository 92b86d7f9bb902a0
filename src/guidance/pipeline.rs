//! Request pipeline: cache, fallback, parse, store.
//!
//! ```text
//! GuidanceRequest ──validate──► Fingerprint ──► ResponseCache::lookup
//!                                                 │ hit        │ miss / bypass
//!                                                 ▼            ▼
//!                                     GuidanceResponse   build_prompt
//!                                      (from_cache)          │
//!                                                            ▼
//!                                               FallbackOrchestrator::generate
//!                                                            │ ok
//!                                                            ▼
//!                                          parse_response ─► ResponseCache::store
//!                                                            │
//!                                                            ▼
//!                                                   GuidanceResponse (fresh)
//! ```
//!
//! Concurrent misses for the same fingerprint are not coalesced; each
//! calls the provider and the last store wins.

use std::time::Instant;

use tracing::{debug, instrument, warn};

use super::parser::parse_response;
use super::prompt::build_prompt;
use crate::cache::{Fingerprint, ResponseCache};
use crate::providers::FallbackOrchestrator;
use crate::telemetry;
use crate::types::{GuidanceRequest, GuidanceResponse};
use crate::{AdvocateError, Result};

/// Answers guidance requests from cache or through the provider fallback chain.
pub struct GuidancePipeline {
    cache: ResponseCache,
    orchestrator: Option<FallbackOrchestrator>,
}

impl GuidancePipeline {
    /// Create a pipeline. Without an orchestrator only cache hits succeed;
    /// misses fail with [`AdvocateError::NoCredentials`].
    pub fn new(cache: ResponseCache, orchestrator: Option<FallbackOrchestrator>) -> Self {
        Self {
            cache,
            orchestrator,
        }
    }

    /// The response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The fallback orchestrator, if credentials are configured.
    pub fn orchestrator(&self) -> Option<&FallbackOrchestrator> {
        self.orchestrator.as_ref()
    }

    /// Answer a request.
    ///
    /// Empty issue text is rejected before any lookup. Nothing is cached
    /// when the provider chain fails.
    #[instrument(
        skip(self, request),
        fields(language = %request.language, summarize = request.summarize, bypass_cache = request.bypass_cache)
    )]
    pub async fn answer(&self, request: &GuidanceRequest) -> Result<GuidanceResponse> {
        request.validate()?;
        let start = Instant::now();
        let issue = request.trimmed_issue();
        let fingerprint = Fingerprint::new(issue, request.language, request.summarize);

        if !request.bypass_cache {
            if let Some(answer) = self.cache.lookup(&fingerprint).await {
                Self::record_request("cache", start, true);
                return Ok(GuidanceResponse::cached(answer));
            }
        } else {
            debug!(fingerprint = %fingerprint, "cache bypass requested");
        }

        let Some(orchestrator) = self.orchestrator.as_ref() else {
            Self::record_request("none", start, false);
            return Err(AdvocateError::NoCredentials);
        };

        let prompt = build_prompt(issue, request.language, request.summarize);
        let generation = match orchestrator.generate(&prompt).await {
            Ok(generation) => generation,
            Err(e) => {
                warn!(error = %e, "guidance request failed");
                Self::record_request("provider", start, false);
                return Err(e);
            }
        };

        let answer = parse_response(&generation.text);
        if answer.is_empty() {
            warn!(model = %generation.model, "reply contained no section headers");
        }
        self.cache
            .store(
                fingerprint,
                issue,
                request.language,
                request.summarize,
                answer.clone(),
            )
            .await;

        Self::record_request("provider", start, true);
        Ok(GuidanceResponse::fresh(
            answer,
            generation.credential_ordinal,
            generation.model,
        ))
    }

    fn record_request(source: &'static str, start: Instant, success: bool) {
        let status = if success { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL, "source" => source, "status" => status)
            .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "source" => source)
            .record(start.elapsed().as_secs_f64());
    }
}
