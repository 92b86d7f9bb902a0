//! Response cache for parsed guidance answers.
//!
//! [`ResponseCache`] maps a [`Fingerprint`] to the [`StructuredAnswer`]
//! produced by the first successful fresh call for those parameters.
//!
//! # Architecture
//!
//! The cache sits in [`GuidancePipeline`](crate::guidance::GuidancePipeline),
//! above the [`FallbackOrchestrator`](crate::providers::FallbackOrchestrator).
//! A cache hit bypasses credential rotation and provider calls entirely.
//!
//! # Expiry
//!
//! Entries carry their creation instant and the horizon is uniform. There
//! is no background timer: an entry past the horizon is removed by the
//! lookup that finds it, or by [`ResponseCache::clear_expired`]. Until then
//! it is still counted by [`ResponseCache::stats`] as expired.
//!
//! Ages are measured with `tokio::time::Instant`, so tests can pause and
//! advance the clock instead of sleeping.
//!
//! # Consistency
//!
//! Storage is moka's concurrent map. Upserts are atomic per key, and the
//! expire-on-lookup path uses `and_compute_with` so an entry is only
//! removed if the one observed is still expired. A concurrent fresh store
//! for the same key therefore cannot be deleted by a stale lookup. Hit
//! counts are atomics on the shared entry.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use super::Fingerprint;
use crate::telemetry;
use crate::types::{Language, StructuredAnswer};

const SECS_PER_HOUR: u64 = 3600;

/// Configuration for the response cache.
///
/// ```rust
/// # use advocate::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(10_000)
///     .expiry_hours(24);
/// assert_eq!(config.expiry, Duration::from_secs(24 * 3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Age at which an entry stops being served. Default: 48 hours.
    pub expiry: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            expiry: Duration::from_secs(48 * SECS_PER_HOUR),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the expiry horizon in whole hours.
    pub fn expiry_hours(mut self, hours: u64) -> Self {
        self.expiry = Duration::from_secs(hours.saturating_mul(SECS_PER_HOUR));
        self
    }

    /// Set the expiry horizon.
    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }
}

/// A cached answer and its bookkeeping.
#[derive(Debug)]
pub struct CacheEntry {
    fingerprint: Fingerprint,
    issue: String,
    language: Language,
    summarize: bool,
    answer: StructuredAnswer,
    hits: AtomicU64,
    created_at: Instant,
}

impl CacheEntry {
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Issue text as stored (trimmed, original case).
    pub fn issue(&self) -> &str {
        &self.issue
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn summarize(&self) -> bool {
        self.summarize
    }

    pub fn answer(&self) -> &StructuredAnswer {
        &self.answer
    }

    /// Number of lookups this entry has served.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Time since the entry was stored.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    fn is_expired(&self, expiry: Duration) -> bool {
        self.age() >= expiry
    }
}

/// Snapshot of cache contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_hits: u64,
    pub expired_entries: u64,
    pub expiry_hours: u64,
}

/// In-memory answer cache keyed on [`Fingerprint`].
pub struct ResponseCache {
    entries: Cache<Fingerprint, Arc<CacheEntry>>,
    expiry: Duration,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = Cache::builder().max_capacity(config.max_entries).build();
        Self {
            entries,
            expiry: config.expiry,
        }
    }

    /// The configured expiry horizon.
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Look up a cached answer.
    ///
    /// Returns `None` on miss. An entry past the expiry horizon is removed
    /// and reported as a miss. A hit increments the entry's hit count; the
    /// returned answer is the stored content.
    pub async fn lookup(&self, fingerprint: &Fingerprint) -> Option<StructuredAnswer> {
        let expiry = self.expiry;
        let result = self
            .entries
            .entry(fingerprint.clone())
            .and_compute_with(|current| {
                let op = match current {
                    Some(entry) if entry.value().is_expired(expiry) => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;

        match result {
            CompResult::Unchanged(entry) => {
                let entry = entry.into_value();
                let hits = entry.hits.fetch_add(1, Ordering::Relaxed) + 1;
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                info!(
                    fingerprint = %fingerprint,
                    age_hours = entry.age().as_secs_f64() / SECS_PER_HOUR as f64,
                    hits,
                    "cache hit"
                );
                Some(entry.answer.clone())
            }
            CompResult::Removed(entry) => {
                metrics::counter!(telemetry::CACHE_EXPIRED_TOTAL).increment(1);
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                info!(
                    fingerprint = %fingerprint,
                    age_hours = entry.value().age().as_secs_f64() / SECS_PER_HOUR as f64,
                    "removed expired cache entry"
                );
                None
            }
            _ => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                debug!(fingerprint = %fingerprint, "cache miss");
                None
            }
        }
    }

    /// Look up the full entry without counting a hit or expiring it.
    pub async fn peek(&self, fingerprint: &Fingerprint) -> Option<Arc<CacheEntry>> {
        self.entries.get(fingerprint).await
    }

    /// Store a fresh answer, replacing any entry with the same fingerprint.
    ///
    /// The hit count starts at zero and the age at now.
    pub async fn store(
        &self,
        fingerprint: Fingerprint,
        issue: &str,
        language: Language,
        summarize: bool,
        answer: StructuredAnswer,
    ) {
        let entry = CacheEntry {
            fingerprint: fingerprint.clone(),
            issue: issue.trim().to_string(),
            language,
            summarize,
            answer,
            hits: AtomicU64::new(0),
            created_at: Instant::now(),
        };
        self.entries.insert(fingerprint.clone(), Arc::new(entry)).await;
        info!(fingerprint = %fingerprint, "cached response");
    }

    /// Totals over the current contents. No side effects.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            total_entries: 0,
            total_hits: 0,
            expired_entries: 0,
            expiry_hours: self.expiry.as_secs() / SECS_PER_HOUR,
        };
        for (_, entry) in self.entries.iter() {
            stats.total_entries += 1;
            stats.total_hits += entry.hits();
            if entry.is_expired(self.expiry) {
                stats.expired_entries += 1;
            }
        }
        stats
    }

    /// Remove every entry. Returns the number removed.
    pub async fn clear_all(&self) -> u64 {
        let keys: Vec<Fingerprint> = self
            .entries
            .iter()
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let mut removed = 0;
        for key in keys {
            if self.entries.remove(&key).await.is_some() {
                removed += 1;
            }
        }
        info!(removed, "cleared response cache");
        removed
    }

    /// Remove entries past the expiry horizon. Returns the number removed.
    pub async fn clear_expired(&self) -> u64 {
        let expiry = self.expiry;
        let candidates: Vec<Fingerprint> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(expiry))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let mut removed = 0;
        for key in candidates {
            // Re-check under the per-key lock; the entry may have been refreshed.
            let result = self
                .entries
                .entry(key)
                .and_compute_with(|current| {
                    let op = match current {
                        Some(entry) if entry.value().is_expired(expiry) => Op::Remove,
                        _ => Op::Nop,
                    };
                    std::future::ready(op)
                })
                .await;
            if matches!(result, CompResult::Removed(_)) {
                removed += 1;
            }
        }
        metrics::counter!(telemetry::CACHE_EXPIRED_TOTAL).increment(removed);
        info!(removed, "removed expired cache entries");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(tag: &str) -> StructuredAnswer {
        StructuredAnswer {
            rights: format!("{tag} rights"),
            steps: format!("{tag} steps"),
            docs: format!("{tag} docs"),
            notice: format!("{tag} notice"),
        }
    }

    #[test]
    fn config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.expiry, Duration::from_secs(48 * 3600));
    }

    #[tokio::test]
    async fn store_trims_issue_text() {
        let cache = ResponseCache::new(&CacheConfig::default());
        let fp = Fingerprint::new("  Deposit  ", Language::English, false);
        cache
            .store(fp.clone(), "  Deposit  ", Language::English, false, answer("a"))
            .await;

        let entry = cache.peek(&fp).await.unwrap();
        assert_eq!(entry.issue(), "Deposit");
        assert_eq!(entry.hits(), 0);
        assert!(!entry.summarize());
    }

    #[tokio::test]
    async fn store_resets_hit_count() {
        let cache = ResponseCache::new(&CacheConfig::default());
        let fp = Fingerprint::new("q", Language::English, false);
        cache
            .store(fp.clone(), "q", Language::English, false, answer("a"))
            .await;
        cache.lookup(&fp).await.unwrap();
        cache.lookup(&fp).await.unwrap();
        assert_eq!(cache.stats().total_hits, 2);

        cache
            .store(fp.clone(), "q", Language::English, false, answer("b"))
            .await;
        assert_eq!(cache.stats().total_hits, 0);
        assert_eq!(cache.lookup(&fp).await.unwrap(), answer("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_survives_until_lookup() {
        let cache = ResponseCache::new(&CacheConfig::new().expiry_hours(1));
        let fp = Fingerprint::new("q", Language::English, false);
        cache
            .store(fp.clone(), "q", Language::English, false, answer("a"))
            .await;

        tokio::time::advance(Duration::from_secs(3600)).await;

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 1);

        assert!(cache.lookup(&fp).await.is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }
}
