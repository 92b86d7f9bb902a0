//! Builder for configuring guidance pipelines

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::cache::{CacheConfig, ResponseCache};
use crate::guidance::GuidancePipeline;
use crate::providers::{CredentialRotator, DEFAULT_MODELS, FallbackOrchestrator, TextProvider};
use crate::{AdvocateError, Result};

/// Main entry point for creating guidance pipelines.
pub struct Advocate;

impl Advocate {
    /// Create a new builder for configuring the pipeline.
    pub fn builder() -> AdvocateBuilder {
        AdvocateBuilder::new()
    }
}

/// Builder for configuring guidance pipelines.
///
/// ```rust,no_run
/// use advocate::{Advocate, CacheConfig, GuidanceRequest};
///
/// # async fn run() -> advocate::Result<()> {
/// let pipeline = Advocate::builder()
///     .credential("first-api-key")
///     .credential("second-api-key")
///     .cache(CacheConfig::new().expiry_hours(24))
///     .build()?;
///
/// let response = pipeline
///     .answer(&GuidanceRequest::new("My landlord won't return my deposit"))
///     .await?;
/// println!("{}", response.answer.rights);
/// # Ok(())
/// # }
/// ```
pub struct AdvocateBuilder {
    credentials: Vec<String>,
    models: Option<Vec<String>>,
    cache: CacheConfig,
    provider: Option<Arc<dyn TextProvider>>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl AdvocateBuilder {
    pub fn new() -> Self {
        Self {
            credentials: Vec::new(),
            models: None,
            cache: CacheConfig::default(),
            provider: None,
            base_url: None,
            timeout: None,
        }
    }

    /// Append a provider credential (lowest priority so far).
    pub fn credential(mut self, secret: impl Into<String>) -> Self {
        self.credentials.push(secret.into());
        self
    }

    /// Append several credentials in priority order.
    pub fn credentials<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.credentials.extend(secrets.into_iter().map(Into::into));
        self
    }

    /// Replace the model chain. Default: [`DEFAULT_MODELS`].
    pub fn models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    /// Configure the response cache.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Use a custom provider instead of the built-in Gemini client.
    pub fn provider(mut self, provider: Arc<dyn TextProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Base URL for the built-in Gemini client.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Per-request timeout for the built-in Gemini client. Default: 60s.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the pipeline.
    ///
    /// Without credentials the pipeline still serves cache hits; misses
    /// fail with [`AdvocateError::NoCredentials`].
    pub fn build(self) -> Result<GuidancePipeline> {
        let cache = ResponseCache::new(&self.cache);
        let models = self
            .models
            .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect());

        let rotator = match CredentialRotator::new(self.credentials) {
            Ok(rotator) => Arc::new(rotator),
            Err(AdvocateError::NoCredentials) => {
                warn!("no provider credentials configured; only cached answers can be served");
                return Ok(GuidancePipeline::new(cache, None));
            }
            Err(e) => return Err(e),
        };

        let provider = match self.provider {
            Some(provider) => provider,
            None => Self::default_provider(self.base_url, self.timeout)?,
        };

        let orchestrator = FallbackOrchestrator::new(provider, rotator, models)?;
        Ok(GuidancePipeline::new(cache, Some(orchestrator)))
    }

    #[cfg(feature = "gemini")]
    fn default_provider(
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Arc<dyn TextProvider>> {
        use crate::providers::GeminiClient;
        use crate::providers::gemini::DEFAULT_BASE_URL;

        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let client = match timeout {
            Some(timeout) => GeminiClient::with_options(base_url, timeout),
            None => GeminiClient::with_base_url(base_url),
        };
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "gemini"))]
    fn default_provider(
        _base_url: Option<String>,
        _timeout: Option<Duration>,
    ) -> Result<Arc<dyn TextProvider>> {
        Err(AdvocateError::Configuration(
            "no provider configured and the `gemini` feature is disabled".to_string(),
        ))
    }
}

impl Default for AdvocateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
