//! Prompt construction for diff summaries.

use super::{NO_SIGNIFICANT_CHANGES, SummaryKind, SummaryRequest};

pub const FIRST_SCAN_MARKER: &str = "[FIRST SCAN - no previous content]";

/// Build the prompt for `request`.
///
/// The model only ever sees the diff lines, never the full page texts.
#[must_use]
pub fn build_prompt(request: &SummaryRequest) -> String {
    let mut prompt = String::from(
        "You are monitoring a web page on behalf of its owner.\n\
         The text below is a line diff of the page's visible text: lines starting with \"+ \" \
         were added, lines starting with \"- \" were removed.\n",
    );

    match request.kind {
        SummaryKind::Baseline => {
            prompt.push_str("This is the first scan of the page.\n");
            prompt.push_str(&format!("PREVIOUS CONTENT: {FIRST_SCAN_MARKER}\n"));
            prompt.push_str(
                "Summarize what the page currently contains in 2-3 concise bullet points.\n",
            );
        }
        SummaryKind::Changes => {
            prompt.push_str(
                "Summarize the significant changes in 2-3 concise bullet points.\n",
            );
            prompt.push_str(&format!(
                "If the changes are only trivial (timestamps, counters, random numbers, rotating \
                 ads), reply with exactly \"{NO_SIGNIFICANT_CHANGES}\".\n"
            ));
        }
    }

    if let Some(note) = request.focus_note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        prompt.push_str(&format!(
            "The owner cares specifically about: {note}. Treat changes unrelated to this as trivial.\n"
        ));
    }

    if request.truncated {
        prompt.push_str("The diff was truncated to fit; summarize only what is shown.\n");
    }

    prompt.push_str("\nDIFF:\n");
    prompt.push_str(&request.diff);
    prompt
}
