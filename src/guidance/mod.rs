//! Guidance generation: prompt, reply parsing, and the request pipeline.

pub mod parser;
pub mod pipeline;
pub mod prompt;

pub use parser::parse_response;
pub use pipeline::GuidancePipeline;
pub use prompt::build_prompt;
