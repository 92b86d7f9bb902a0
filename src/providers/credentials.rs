//! Provider credentials and the shared rotation index.
//!
//! A [`CredentialRotator`] owns an ordered, immutable set of
//! [`Credential`]s and the index of the one currently in use. The index is
//! the only cross-request mutable state in the fallback path; it lives in
//! an `AtomicUsize` so concurrent requests always read a valid position.
//!
//! # Concurrent exhaustion
//!
//! Two requests can observe the same credential run out of quota at the
//! same moment. [`CredentialRotator::advance_from`] only moves the index if
//! it still points at the credential the caller observed, so both requests
//! together advance by one credential rather than two.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{AdvocateError, Result};

/// An opaque provider secret and its position in the configured set.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    secret: String,
    position: usize,
}

impl Credential {
    /// Create a credential at a zero-based position.
    pub fn new(secret: impl Into<String>, position: usize) -> Self {
        Self {
            secret: secret.into(),
            position,
        }
    }

    /// The raw secret. Only provider clients should read this.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Zero-based position in the credential set.
    pub fn position(&self) -> usize {
        self.position
    }

    /// One-based ordinal reported to callers ("key #1").
    pub fn ordinal(&self) -> usize {
        self.position + 1
    }

    /// Masked form safe for logs: first 8 and last 4 characters.
    ///
    /// Secrets too short to mask meaningfully are fully hidden.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.secret.chars().collect();
        if chars.len() <= 12 {
            return "****".to_string();
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("ordinal", &self.ordinal())
            .field("secret", &self.masked())
            .finish()
    }
}

/// Ordered credential set with a shared current index.
pub struct CredentialRotator {
    credentials: Vec<Credential>,
    current: AtomicUsize,
}

impl CredentialRotator {
    /// Build a rotator from secrets in priority order.
    ///
    /// Blank secrets are skipped. Returns [`AdvocateError::NoCredentials`]
    /// if nothing usable remains.
    pub fn new<I, S>(secrets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let credentials: Vec<Credential> = secrets
            .into_iter()
            .map(Into::into)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(position, secret)| Credential::new(secret, position))
            .collect();

        if credentials.is_empty() {
            return Err(AdvocateError::NoCredentials);
        }

        Ok(Self {
            credentials,
            current: AtomicUsize::new(0),
        })
    }

    /// Number of credentials. Always at least one.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Always false; construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// All credentials in priority order.
    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    /// Index of the credential currently in use.
    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    /// The credential currently in use.
    pub fn current(&self) -> &Credential {
        &self.credentials[self.current_index()]
    }

    /// Move to the next credential, wrapping around. Returns the new index.
    pub fn advance(&self) -> usize {
        let n = self.credentials.len();
        let previous = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % n))
            .unwrap_or_else(|i| i);
        (previous + 1) % n
    }

    /// Advance only if the index still points at `observed`.
    ///
    /// Returns the index after the call. If another request already moved
    /// past `observed`, the index is left where that request put it.
    pub fn advance_from(&self, observed: usize) -> usize {
        let next = (observed + 1) % self.credentials.len();
        match self
            .current
            .compare_exchange(observed, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => next,
            Err(actual) => actual,
        }
    }

    /// Whether the index is back at `start_index`.
    ///
    /// Meaningful after at least one advance: it then signals that every
    /// credential has been tried since `start_index` was recorded.
    pub fn exhausted_full_cycle(&self, start_index: usize) -> bool {
        self.current_index() == start_index
    }

    /// Masked secrets in priority order.
    pub fn masked(&self) -> Vec<String> {
        self.credentials.iter().map(Credential::masked).collect()
    }
}

impl fmt::Debug for CredentialRotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRotator")
            .field("credentials", &self.credentials)
            .field("current", &self.current_index())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_rejected() {
        let err = CredentialRotator::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, AdvocateError::NoCredentials));
    }

    #[test]
    fn blank_secrets_are_skipped() {
        let rotator = CredentialRotator::new(["", "  ", "key-a"]).unwrap();
        assert_eq!(rotator.len(), 1);
        assert_eq!(rotator.current().secret(), "key-a");
        assert_eq!(rotator.current().position(), 0);
    }

    #[test]
    fn all_blank_is_rejected() {
        assert!(CredentialRotator::new(["", " "]).is_err());
    }

    #[test]
    fn advance_wraps() {
        let rotator = CredentialRotator::new(["a", "b", "c"]).unwrap();
        assert_eq!(rotator.advance(), 1);
        assert_eq!(rotator.advance(), 2);
        assert_eq!(rotator.advance(), 0);
        assert_eq!(rotator.current().secret(), "a");
    }

    #[test]
    fn single_credential_cycles_immediately() {
        let rotator = CredentialRotator::new(["only"]).unwrap();
        let start = rotator.current_index();
        rotator.advance();
        assert!(rotator.exhausted_full_cycle(start));
    }

    #[test]
    fn full_cycle_detection() {
        let rotator = CredentialRotator::new(["a", "b", "c"]).unwrap();
        let start = rotator.current_index();
        rotator.advance();
        assert!(!rotator.exhausted_full_cycle(start));
        rotator.advance();
        assert!(!rotator.exhausted_full_cycle(start));
        rotator.advance();
        assert!(rotator.exhausted_full_cycle(start));
    }

    #[test]
    fn advance_from_is_idempotent_for_same_observation() {
        let rotator = CredentialRotator::new(["a", "b", "c"]).unwrap();
        assert_eq!(rotator.advance_from(0), 1);
        // A second request that also saw key 0 fail does not skip key 1.
        assert_eq!(rotator.advance_from(0), 1);
        assert_eq!(rotator.current_index(), 1);
    }

    #[test]
    fn masking_hides_middle() {
        let cred = Credential::new("AIzaSyA1234567890abcdWXYZ", 0);
        assert_eq!(cred.masked(), "AIzaSyA1...WXYZ");
        assert_eq!(Credential::new("short", 0).masked(), "****");
    }

    #[test]
    fn debug_never_prints_secret() {
        let cred = Credential::new("AIzaSyA1234567890abcdWXYZ", 1);
        let debug = format!("{cred:?}");
        assert!(!debug.contains("1234567890"));
        assert!(debug.contains("ordinal: 2"));
    }
}
