//! Advocate - legal guidance backend core
//!
//! This crate turns a free-text legal issue into a four-part structured
//! answer (rights, steps, documents, notice) using a generative text API.
//! Answers are cached by request fingerprint, and provider calls fall back
//! across an ordered model chain and a rotating set of API credentials.
//!
//! # Example
//!
//! ```rust,no_run
//! use advocate::{Advocate, GuidanceRequest, Language};
//!
//! #[tokio::main]
//! async fn main() -> advocate::Result<()> {
//!     let pipeline = Advocate::builder()
//!         .credential("your-gemini-key")
//!         .build()?;
//!
//!     let request = GuidanceRequest::new("My landlord won't return my deposit")
//!         .language(Language::Hindi)
//!         .summarize(true);
//!     let response = pipeline.answer(&request).await?;
//!
//!     println!("{}", response.answer.rights);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `gemini` (default): built-in Google Gemini client.
//! - `server`: the `advd` HTTP daemon and its config loader.

pub mod cache;
pub mod error;
pub mod gateway;
pub mod guidance;
pub mod providers;
pub mod quota;
pub mod rewards;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheStats, Fingerprint, ResponseCache};
pub use error::{AdvocateError, FailureKind, Result};
pub use gateway::{Advocate, AdvocateBuilder};
pub use guidance::GuidancePipeline;
pub use providers::{Credential, CredentialRotator, FallbackOrchestrator, TextProvider};
pub use quota::{FreeTierConfig, FreeTierLimiter, UsageStatus};
pub use types::{GuidanceRequest, GuidanceResponse, Language, StructuredAnswer};
pub use version::{PKG_VERSION, version_string};
