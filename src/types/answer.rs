//! Structured answers and outbound responses.

use serde::{Deserialize, Serialize};

/// Four-part guidance parsed from a model reply.
///
/// Any section may be empty when the reply omitted its header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    pub rights: String,
    pub steps: String,
    pub docs: String,
    pub notice: String,
}

impl StructuredAnswer {
    /// Whether every section is empty.
    pub fn is_empty(&self) -> bool {
        self.rights.is_empty()
            && self.steps.is_empty()
            && self.docs.is_empty()
            && self.notice.is_empty()
    }
}

/// Pipeline output: the answer plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceResponse {
    #[serde(flatten)]
    pub answer: StructuredAnswer,
    /// True when served from the response cache.
    pub from_cache: bool,
    /// 1-based ordinal of the credential that produced a fresh answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_ordinal: Option<usize>,
    /// Model that produced a fresh answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl GuidanceResponse {
    /// Wrap a cached answer.
    pub fn cached(answer: StructuredAnswer) -> Self {
        Self {
            answer,
            from_cache: true,
            credential_ordinal: None,
            model: None,
        }
    }

    /// Wrap a freshly generated answer.
    pub fn fresh(answer: StructuredAnswer, credential_ordinal: usize, model: String) -> Self {
        Self {
            answer,
            from_cache: false,
            credential_ordinal: Some(credential_ordinal),
            model: Some(model),
        }
    }
}
