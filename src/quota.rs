//! Free-tier daily quota.
//!
//! Unauthenticated callers identify themselves with a client id and get
//! `daily_limit` successful answers per window. The window opens at the
//! first request after a reset and lasts `window` (24 hours by default).
//! Only successful answers count against the quota.
//!
//! Counter storage is behind [`UsageStore`] so deployments can persist it;
//! [`InMemoryUsageStore`] keeps it for the process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::info;

use crate::telemetry;
use crate::{AdvocateError, Result};

const SECS_PER_HOUR: f64 = 3600.0;

/// Free-tier limits.
#[derive(Debug, Clone)]
pub struct FreeTierConfig {
    /// Successful requests allowed per window. Default: 5.
    pub daily_limit: u32,
    /// Window length. Default: 24 hours.
    pub window: Duration,
    /// Minimum issue length in characters. Default: 10.
    pub min_issue_chars: usize,
}

impl Default for FreeTierConfig {
    fn default() -> Self {
        Self {
            daily_limit: 5,
            window: Duration::from_secs(24 * 3600),
            min_issue_chars: 10,
        }
    }
}

/// Stored usage for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRecord {
    pub count: u32,
    pub window_start: Instant,
}

/// Storage seam for per-client usage counters.
pub trait UsageStore: Send + Sync {
    /// Replace the client's record with `f(current)` atomically and return it.
    fn update(
        &self,
        client_id: &str,
        f: &mut dyn FnMut(Option<UsageRecord>) -> UsageRecord,
    ) -> UsageRecord;
}

/// Process-local usage store.
#[derive(Debug, Default)]
pub struct InMemoryUsageStore {
    records: Mutex<HashMap<String, UsageRecord>>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageStore for InMemoryUsageStore {
    fn update(
        &self,
        client_id: &str,
        f: &mut dyn FnMut(Option<UsageRecord>) -> UsageRecord,
    ) -> UsageRecord {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let next = f(records.get(client_id).copied());
        records.insert(client_id.to_string(), next);
        next
    }
}

/// Usage report for one client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageStatus {
    pub daily_limit: u32,
    pub used: u32,
    pub remaining: u32,
    /// Hours until the window resets, rounded to one decimal.
    pub reset_in_hours: f64,
}

/// Enforces the free-tier quota.
pub struct FreeTierLimiter {
    store: Arc<dyn UsageStore>,
    config: FreeTierConfig,
}

impl FreeTierLimiter {
    /// Create a limiter over a custom store.
    pub fn new(store: Arc<dyn UsageStore>, config: FreeTierConfig) -> Self {
        Self { store, config }
    }

    /// Create a limiter with an in-memory store.
    pub fn in_memory(config: FreeTierConfig) -> Self {
        Self::new(Arc::new(InMemoryUsageStore::new()), config)
    }

    pub fn config(&self) -> &FreeTierConfig {
        &self.config
    }

    /// Current usage, opening or resetting the window as needed.
    pub fn status(&self, client_id: &str) -> Result<UsageStatus> {
        let client_id = Self::require_client(client_id)?;
        let record = self
            .store
            .update(client_id, &mut |current| self.current_window(current));
        Ok(self.report(record))
    }

    /// Usage if the client may make another request, else `QuotaReached`.
    pub fn check(&self, client_id: &str) -> Result<UsageStatus> {
        let status = self.status(client_id)?;
        if status.remaining == 0 {
            metrics::counter!(telemetry::FREE_TIER_REJECTIONS_TOTAL).increment(1);
            info!(client_id, "free tier limit reached");
            return Err(AdvocateError::QuotaReached {
                limit: self.config.daily_limit,
                reset_in_hours: status.reset_in_hours,
            });
        }
        Ok(status)
    }

    /// Reject issue texts too short to answer usefully.
    pub fn validate_issue(&self, issue: &str) -> Result<()> {
        if issue.trim().chars().count() < self.config.min_issue_chars {
            return Err(AdvocateError::InvalidInput(
                "please provide more details about your issue".to_string(),
            ));
        }
        Ok(())
    }

    /// Count one successful answer and return the updated usage.
    pub fn record_success(&self, client_id: &str) -> Result<UsageStatus> {
        let client_id = Self::require_client(client_id)?;
        let record = self.store.update(client_id, &mut |current| {
            let mut record = self.current_window(current);
            record.count = record.count.saturating_add(1);
            record
        });
        Ok(self.report(record))
    }

    fn require_client(client_id: &str) -> Result<&str> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(AdvocateError::InvalidInput(
                "client id required for free tier".to_string(),
            ));
        }
        Ok(client_id)
    }

    fn current_window(&self, current: Option<UsageRecord>) -> UsageRecord {
        match current {
            Some(record) if record.window_start.elapsed() < self.config.window => record,
            _ => UsageRecord {
                count: 0,
                window_start: Instant::now(),
            },
        }
    }

    fn report(&self, record: UsageRecord) -> UsageStatus {
        let left = self
            .config
            .window
            .saturating_sub(record.window_start.elapsed());
        UsageStatus {
            daily_limit: self.config.daily_limit,
            used: record.count,
            remaining: self.config.daily_limit.saturating_sub(record.count),
            reset_in_hours: (left.as_secs_f64() / SECS_PER_HOUR * 10.0).round() / 10.0,
        }
    }
}
