//! Telemetry metric name constants.
//!
//! Centralised metric names for advocate operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `advocate_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "gemini")
//! - `model`: model identifier attempted
//! - `outcome`: "ok" or a failure kind ("not_found", "quota_exhausted", ...)
//! - `source`: where an answer came from: "cache" or "provider"

/// Total guidance requests answered or failed by the pipeline.
///
/// Labels: `source` ("cache" | "provider" | "none"), `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "advocate_requests_total";

/// Pipeline request duration in seconds.
///
/// Labels: `source`.
pub const REQUEST_DURATION_SECONDS: &str = "advocate_request_duration_seconds";

/// Total single-model provider attempts made by the orchestrator.
///
/// Labels: `provider`, `model`, `outcome`.
pub const PROVIDER_ATTEMPTS_TOTAL: &str = "advocate_provider_attempts_total";

/// Total credential rotations.
///
/// Labels: `reason` ("quota_exhausted" | "invalid_credential" | "models_exhausted").
pub const CREDENTIAL_ROTATIONS_TOTAL: &str = "advocate_credential_rotations_total";

/// Total orchestrations that ended with every credential exhausted.
pub const PROVIDERS_EXHAUSTED_TOTAL: &str = "advocate_providers_exhausted_total";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "advocate_cache_hits_total";

/// Total response cache misses, including lazily expired entries.
pub const CACHE_MISSES_TOTAL: &str = "advocate_cache_misses_total";

/// Total cache entries removed because they outlived the expiry horizon.
pub const CACHE_EXPIRED_TOTAL: &str = "advocate_cache_expired_total";

/// Total free-tier requests rejected for exceeding the daily limit.
pub const FREE_TIER_REJECTIONS_TOTAL: &str = "advocate_free_tier_rejections_total";
