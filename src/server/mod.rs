//! HTTP server for advd.
//!
//! This module provides:
//! - Configuration types (`config`)
//! - Bearer authentication (`auth`)
//! - The axum service (`service`)

pub mod auth;
pub mod config;
pub mod service;

pub use auth::{Authenticator, StaticTokenAuthenticator};
pub use service::{AppState, router};
