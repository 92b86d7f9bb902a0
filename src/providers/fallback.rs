//! Credential and model fallback orchestration.
//!
//! The [`FallbackOrchestrator`] drives one prompt through an ordered list
//! of models under each credential until a reply comes back or every
//! credential has been tried.
//!
//! # Retry policy
//!
//! Failures are scoped by [`FailureKind`]:
//! - `NotFound` and `Transient` (including empty replies) are model-scoped:
//!   the same credential may work with the next model.
//! - `QuotaExhausted` and `InvalidCredential` are credential-scoped: the
//!   remaining models are skipped and the rotator advances.
//!
//! A credential whose models all fail without a credential-scoped error is
//! rotated away from as well, so the next request starts on a fresh key.
//!
//! ```text
//!   start = rotator.current_index()
//!         │
//!         ▼
//!   ┌───────────────┐  success   ┌──────────────┐
//!   │ credential k  │───────────►│  Generation  │
//!   │ model 0..m    │            └──────────────┘
//!   └───────┬───────┘
//!           │ quota / invalid key / all models failed
//!           ▼
//!     advance_from(k) ── back at start? ──► ProvidersExhausted
//! ```

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::credentials::CredentialRotator;
use super::traits::TextProvider;
use crate::error::FailureKind;
use crate::telemetry;
use crate::{AdvocateError, Result};

/// Default model chain, best quality and highest free quota first.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
];

/// A successful raw reply and its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    /// 1-based ordinal of the credential that produced the reply.
    pub credential_ordinal: usize,
    pub model: String,
}

/// Outcome of a single model attempt.
#[derive(Debug, PartialEq, Eq)]
enum ModelAttempt {
    Success(String),
    Failure { kind: FailureKind, message: String },
}

impl ModelAttempt {
    fn classify(result: Result<String>, model: &str) -> Self {
        match result {
            Ok(text) if !text.trim().is_empty() => Self::Success(text),
            Ok(_) => Self::Failure {
                kind: FailureKind::Transient,
                message: format!("{} ({model})", AdvocateError::EmptyResponse),
            },
            Err(e) => Self::Failure {
                kind: e.failure_kind(),
                message: e.to_string(),
            },
        }
    }
}

/// Drives the credential × model fallback sequence for one prompt.
pub struct FallbackOrchestrator {
    provider: Arc<dyn TextProvider>,
    rotator: Arc<CredentialRotator>,
    models: Vec<String>,
}

impl FallbackOrchestrator {
    /// Create an orchestrator over `models` in priority order.
    ///
    /// Returns a configuration error if `models` is empty.
    pub fn new(
        provider: Arc<dyn TextProvider>,
        rotator: Arc<CredentialRotator>,
        models: Vec<String>,
    ) -> Result<Self> {
        if models.is_empty() {
            return Err(AdvocateError::Configuration(
                "at least one model is required".to_string(),
            ));
        }
        Ok(Self {
            provider,
            rotator,
            models,
        })
    }

    /// The shared credential rotator.
    pub fn rotator(&self) -> &Arc<CredentialRotator> {
        &self.rotator
    }

    /// Models in the order they are tried.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Produce a non-empty reply for `prompt`, or fail once every
    /// credential has been tried.
    ///
    /// The outer loop runs at most once per credential. The error carries
    /// the last provider failure message for diagnostics.
    #[instrument(skip_all, fields(provider = self.provider.name()))]
    pub async fn generate(&self, prompt: &str) -> Result<Generation> {
        let start_index = self.rotator.current_index();
        let mut last_error: Option<String> = None;

        for _ in 0..self.rotator.len() {
            let index = self.rotator.current_index();
            let credential = &self.rotator.credentials()[index];
            debug!(
                credential = credential.ordinal(),
                key = %credential.masked(),
                "using credential"
            );

            let mut rotation_reason = "models_exhausted";
            for model in &self.models {
                let result = self.provider.attempt(prompt, credential, model).await;
                match ModelAttempt::classify(result, model) {
                    ModelAttempt::Success(text) => {
                        self.record_attempt(model, "ok");
                        info!(
                            model = %model,
                            credential = credential.ordinal(),
                            "provider call succeeded"
                        );
                        return Ok(Generation {
                            text,
                            credential_ordinal: credential.ordinal(),
                            model: model.clone(),
                        });
                    }
                    ModelAttempt::Failure { kind, message } => {
                        self.record_attempt(model, kind.as_str());
                        if kind.is_credential_scoped() {
                            warn!(
                                model = %model,
                                credential = credential.ordinal(),
                                kind = kind.as_str(),
                                error = %message,
                                "credential unusable, rotating"
                            );
                            last_error = Some(message);
                            rotation_reason = kind.as_str();
                            break;
                        }
                        debug!(
                            model = %model,
                            kind = kind.as_str(),
                            error = %message,
                            "model failed, trying next model"
                        );
                        last_error = Some(message);
                    }
                }
            }

            metrics::counter!(telemetry::CREDENTIAL_ROTATIONS_TOTAL, "reason" => rotation_reason)
                .increment(1);
            self.rotator.advance_from(index);
            if self.rotator.exhausted_full_cycle(start_index) {
                break;
            }
        }

        metrics::counter!(telemetry::PROVIDERS_EXHAUSTED_TOTAL).increment(1);
        warn!(
            credentials = self.rotator.len(),
            last_error = last_error.as_deref().unwrap_or("none"),
            "all credentials exhausted"
        );
        Err(AdvocateError::ProvidersExhausted { last_error })
    }

    fn record_attempt(&self, model: &str, outcome: &'static str) {
        metrics::counter!(telemetry::PROVIDER_ATTEMPTS_TOTAL,
            "provider" => self.provider.name().to_owned(),
            "model" => model.to_owned(),
            "outcome" => outcome,
        )
        .increment(1);
    }
}
