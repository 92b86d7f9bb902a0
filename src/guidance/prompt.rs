//! Prompt construction.

use super::parser::{DOCS_MARKER, NOTICE_MARKER, RIGHTS_MARKER, STEPS_MARKER};
use crate::types::Language;

/// Instruction appended when a concise answer is requested.
pub const SUMMARY_INSTRUCTION: &str = " Keep responses concise and summarized.";

/// Build the generation prompt for an issue.
///
/// The headers embedded here are the markers the parser looks for.
pub fn build_prompt(issue: &str, language: Language, summarize: bool) -> String {
    let summary = if summarize { SUMMARY_INSTRUCTION } else { "" };
    let lang = language.display_name();
    format!(
        "You are an AI legal guidance assistant. Respond ONLY in {lang}.{summary}

User's Legal Issue: {issue}

Output EXACTLY these 4 sections with these exact headers:
{RIGHTS_MARKER}
[List the user's legal rights related to this issue]

{STEPS_MARKER}
[List actionable steps the user should take]

{DOCS_MARKER}
[List documents needed for this case]

{NOTICE_MARKER}
[Provide a professional legal notice template]

Be precise. Be actionable. No disclaimers."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_language() {
        let prompt = build_prompt("deposit", Language::Tamil, false);
        assert!(prompt.contains("Respond ONLY in Tamil."));
        assert!(!prompt.contains(SUMMARY_INSTRUCTION.trim()));
    }

    #[test]
    fn prompt_includes_summary_instruction() {
        let prompt = build_prompt("deposit", Language::English, true);
        assert!(prompt.contains("Respond ONLY in English. Keep responses concise and summarized."));
    }

    #[test]
    fn prompt_embeds_issue_and_all_headers() {
        let prompt = build_prompt("My landlord won't return my deposit", Language::English, false);
        assert!(prompt.contains("User's Legal Issue: My landlord won't return my deposit"));
        for marker in [RIGHTS_MARKER, STEPS_MARKER, DOCS_MARKER, NOTICE_MARKER] {
            assert!(prompt.contains(marker), "missing {marker}");
        }
    }
}
