//! Public types for the Advocate API.

mod answer;
mod language;
mod request;

pub use answer::{GuidanceResponse, StructuredAnswer};
pub use language::Language;
pub use request::GuidanceRequest;
