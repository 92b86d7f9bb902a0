//! Cache fingerprints.
//!
//! A fingerprint is the SHA-256 of `normalized_issue|language|flag`, where
//! the issue is trimmed and lowercased and the flag is `1` for summarized
//! answers and `0` otherwise. It is stable across processes, so a shared
//! backend could key on it directly.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::Language;

/// Hex-encoded SHA-256 cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint for the given request parameters.
    pub fn new(issue: &str, language: Language, summarize: bool) -> Self {
        fingerprint(issue, language.code(), summarize)
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute a fingerprint from a raw language code.
pub fn fingerprint(issue: &str, language_code: &str, summarize: bool) -> Fingerprint {
    let normalized = issue.trim().to_lowercase();
    let flag = if summarize { "1" } else { "0" };

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.update(b"|");
    hasher.update(language_code.as_bytes());
    hasher.update(b"|");
    hasher.update(flag.as_bytes());
    Fingerprint(format!("{:x}", hasher.finalize()))
}
