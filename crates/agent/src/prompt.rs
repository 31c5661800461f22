//! Prompt augmentation for retrieval-grounded answers.

use dualchat_core::knowledge::Document;

/// Instruction line that opens every augmented prompt.
pub const INSTRUCTION: &str = "Answer the question using only the context below.";

/// Placeholder for the context block when retrieval found nothing.
pub const NO_DOCUMENTS: &str = "(no relevant documents found)";

/// Build the augmented user prompt.
///
/// ```text
/// Answer the question using only the context below.
///
/// Context:
/// [1] <content> (source: <url>)
/// [2] <content>
///
/// Question: <prompt>
/// ```
///
/// Documents keep their retrieval order. The `(source: ..)` suffix is
/// added only for documents that carry `source_key` metadata.
pub fn augment(prompt: &str, documents: &[Document], source_key: &str) -> String {
    let mut out = String::with_capacity(
        prompt.len() + documents.iter().map(|d| d.content.len() + 32).sum::<usize>() + 96,
    );
    out.push_str(INSTRUCTION);
    out.push_str("\n\nContext:\n");

    if documents.is_empty() {
        out.push_str(NO_DOCUMENTS);
        out.push('\n');
    }

    for (i, doc) in documents.iter().enumerate() {
        out.push_str(&format!("[{}] {}", i + 1, doc.content.trim()));
        if let Some(source) = doc.meta_str(source_key).filter(|s| !s.trim().is_empty()) {
            out.push_str(&format!(" (source: {source})"));
        }
        out.push('\n');
    }

    out.push_str("\nQuestion: ");
    out.push_str(prompt);
    out
}
