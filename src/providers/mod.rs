//! Provider plumbing: credentials, the provider trait, and fallback.
//!
//! - [`credentials`] holds the ordered credential set and rotation index.
//! - [`traits::TextProvider`] is the single-call seam to a model backend.
//! - [`fallback::FallbackOrchestrator`] drives credential and model fallback.
//! - [`gemini::GeminiClient`] is the HTTP backend used by the daemon.

pub mod credentials;
pub mod fallback;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod traits;

pub use credentials::{Credential, CredentialRotator};
pub use fallback::{DEFAULT_MODELS, FallbackOrchestrator, Generation};
#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
pub use traits::TextProvider;
