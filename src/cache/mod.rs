//! Caching subsystem.
//!
//! - [`fingerprint`] derives stable cache keys from normalized request
//!   parameters.
//!
//! - [`response::ResponseCache`] stores parsed answers keyed on fingerprint,
//!   with a uniform expiry horizon checked lazily on lookup or by an
//!   explicit sweep, and per-entry hit counting.

pub mod fingerprint;
pub mod response;

pub use fingerprint::{Fingerprint, fingerprint};
pub use response::{CacheConfig, CacheEntry, CacheStats, ResponseCache};
