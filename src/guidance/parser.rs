//! Splits a model reply into the four guidance sections.
//!
//! The prompt asks for four headers in a fixed order. Parsing locates
//! every header first, then slices the text between consecutive header
//! offsets. A missing header leaves its section empty; headers emitted
//! out of order are still attributed correctly. Parsing never fails.

use crate::types::StructuredAnswer;

/// Header introducing the rights section.
pub const RIGHTS_MARKER: &str = "YOUR RIGHTS:";
/// Header introducing the steps section.
pub const STEPS_MARKER: &str = "IMMEDIATE STEPS:";
/// Header introducing the documents section.
pub const DOCS_MARKER: &str = "REQUIRED DOCUMENTS:";
/// Header introducing the notice template section.
pub const NOTICE_MARKER: &str = "FORMAL NOTICE FORMAT:";

#[derive(Clone, Copy)]
enum Section {
    Rights,
    Steps,
    Docs,
    Notice,
}

const MARKERS: [(Section, &str); 4] = [
    (Section::Rights, RIGHTS_MARKER),
    (Section::Steps, STEPS_MARKER),
    (Section::Docs, DOCS_MARKER),
    (Section::Notice, NOTICE_MARKER),
];

/// Parse raw reply text into a [`StructuredAnswer`].
pub fn parse_response(text: &str) -> StructuredAnswer {
    // (marker start, content start, section)
    let mut found: Vec<(usize, usize, Section)> = MARKERS
        .iter()
        .filter_map(|&(section, marker)| {
            text.find(marker)
                .map(|start| (start, start + marker.len(), section))
        })
        .collect();
    found.sort_by_key(|&(start, _, _)| start);

    let mut answer = StructuredAnswer::default();
    for (i, &(_, content_start, section)) in found.iter().enumerate() {
        let content_end = found
            .get(i + 1)
            .map(|&(next_start, _, _)| next_start)
            .unwrap_or(text.len());
        let content = text[content_start..content_end].trim().to_string();
        match section {
            Section::Rights => answer.rights = content,
            Section::Steps => answer.steps = content,
            Section::Docs => answer.docs = content,
            Section::Notice => answer.notice = content,
        }
    }
    answer
}
