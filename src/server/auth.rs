//! Bearer authentication for privileged routes.
//!
//! Handlers call an [`Authenticator`] with the token from the
//! `Authorization: Bearer <token>` header. Token issuance (login, JWT) is
//! outside this crate; deployments plug in their own verifier.

use std::collections::HashSet;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::{AdvocateError, Result};

/// Verifies bearer tokens.
pub trait Authenticator: Send + Sync {
    /// Accept or reject `token`.
    fn authenticate(&self, token: &str) -> Result<()>;
}

/// Accepts a fixed set of tokens. With no tokens configured, rejects everything.
#[derive(Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashSet<String>,
}

impl StaticTokenAuthenticator {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t| !t.trim().is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Result<()> {
        if self.tokens.contains(token) {
            Ok(())
        } else {
            Err(AdvocateError::Unauthorized("invalid token".to_string()))
        }
    }
}

/// Extract the bearer token from request headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AdvocateError::Unauthorized("missing bearer token".to_string()))?;
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AdvocateError::Unauthorized("malformed authorization header".to_string()))
}
