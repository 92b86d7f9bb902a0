//! Inbound guidance request.

use serde::{Deserialize, Serialize};

use super::Language;
use crate::{AdvocateError, Result};

/// A request for legal guidance on a free-text issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuidanceRequest {
    /// Free-text description of the issue.
    pub issue: String,
    /// Answer language. Default: English.
    #[serde(default)]
    pub language: Language,
    /// Ask the model for a concise answer.
    #[serde(default)]
    pub summarize: bool,
    /// Skip the cache lookup and force a fresh provider call.
    #[serde(default, alias = "skip_cache")]
    pub bypass_cache: bool,
}

impl GuidanceRequest {
    /// Create a request for `issue` with default options.
    pub fn new(issue: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            ..Self::default()
        }
    }

    /// Set the answer language.
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Request a concise answer.
    pub fn summarize(mut self, summarize: bool) -> Self {
        self.summarize = summarize;
        self
    }

    /// Force a fresh provider call even when a cached answer exists.
    pub fn bypass_cache(mut self, bypass: bool) -> Self {
        self.bypass_cache = bypass;
        self
    }

    /// Issue text with surrounding whitespace removed.
    pub fn trimmed_issue(&self) -> &str {
        self.issue.trim()
    }

    /// Reject requests whose issue text is empty after trimming.
    pub fn validate(&self) -> Result<()> {
        if self.trimmed_issue().is_empty() {
            return Err(AdvocateError::InvalidInput(
                "issue text cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
