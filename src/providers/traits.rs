//! Provider trait for text generation backends.
//!
//! A [`TextProvider`] makes exactly one call: one prompt, one credential,
//! one model. It does not retry, rotate, or choose models; that is the
//! [`FallbackOrchestrator`](super::FallbackOrchestrator)'s job.
//!
//! # Error Semantics
//!
//! Providers report failures as [`AdvocateError`](crate::AdvocateError)
//! values, preferring structured variants so the orchestrator can classify
//! them without inspecting message text:
//! - `ModelNotFound`: try the next model
//! - `RateLimited` / `AuthenticationFailed`: abandon this credential
//! - anything else: try the next model
//!
//! An `Ok` with empty text is a soft failure, handled like `EmptyResponse`.

use async_trait::async_trait;

use super::credentials::Credential;
use crate::Result;

/// Backend that turns a prompt into raw reply text.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Generate a reply for `prompt` with `model`, authenticated by `credential`.
    async fn attempt(&self, prompt: &str, credential: &Credential, model: &str)
    -> Result<String>;
}
