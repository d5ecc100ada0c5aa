//! Prompt builder: fixed persona, the literal user question, and a ranked
//! context block.
//!
//! The structure is not user-configurable. Each retrieved document appears
//! as a numbered `[Article N]` entry with its title and similarity, then
//! its content preview (already bounded at indexing time), in the rank
//! order produced by the similarity search, separated by a visible
//! delimiter.

use semantic_index::ScoredDocument;

/// System instruction establishing the assistant persona and response
/// language. Kept short: it steers without wasting tokens.
pub const SYSTEM_PROMPT: &str = "\
You are a technical assistant for an internal knowledge base covering Linux, \
Node.js, DevOps and systems administration.
Always answer in English, clearly, structured and professional.
";

/// Visible separator between context entries.
pub const CONTEXT_DELIMITER: &str = "────────────────────";

/// Returned when no stored document clears the similarity floor. The
/// generation backend is never invoked in that case.
pub const NO_MATCH_ANSWER: &str =
    "I could not find any sufficiently relevant article for this question.";

/// Fixed apology returned when the generation backend is down or errors.
/// Retrieval results are still returned alongside it.
pub const GENERATION_FALLBACK: &str = "Sorry, an error occurred while generating the answer. \
Please check that the generation server is running and the model is loaded.";

/// Render one context entry: `[Article N] (title – similarity X.XXX)`
/// followed by the preview.
fn context_entry(index: usize, doc: &ScoredDocument) -> String {
    format!(
        "[Article {}] ({} – similarity {:.3})\n{}",
        index + 1,
        doc.title,
        doc.similarity,
        doc.preview
    )
}

/// Build the full generation prompt from the question and ranked context.
pub fn build_prompt(question: &str, context: &[ScoredDocument]) -> String {
    let context_block = context
        .iter()
        .enumerate()
        .map(|(i, doc)| context_entry(i, doc))
        .collect::<Vec<_>>()
        .join(&format!("\n{CONTEXT_DELIMITER}\n"));

    format!(
        "{SYSTEM_PROMPT}\n\
         User question: {question}\n\n\
         Context extracted from the knowledge-base articles:\n\
         {context_block}\n\n\
         Answer now, based on the provided context:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: u64, title: &str, preview: &str, similarity: f32) -> ScoredDocument {
        ScoredDocument {
            id,
            title: title.to_string(),
            preview: preview.to_string(),
            similarity,
        }
    }

    #[test]
    fn entries_are_numbered_in_rank_order() {
        let context = vec![
            doc(7, "Backups", "Use snapshots.", 0.912),
            doc(3, "Monitoring", "Use alerts.", 0.514),
        ];
        let prompt = build_prompt("how to back up data", &context);

        let first = prompt.find("[Article 1] (Backups – similarity 0.912)").unwrap();
        let second = prompt
            .find("[Article 2] (Monitoring – similarity 0.514)")
            .unwrap();
        assert!(first < second);
    }

    #[test]
    fn entries_are_separated_by_the_delimiter() {
        let context = vec![
            doc(1, "a", "pa", 0.9),
            doc(2, "b", "pb", 0.8),
            doc(3, "c", "pc", 0.7),
        ];
        let prompt = build_prompt("q", &context);
        assert_eq!(prompt.matches(CONTEXT_DELIMITER).count(), 2);
    }

    #[test]
    fn prompt_carries_persona_question_and_previews() {
        let context = vec![doc(1, "Backups", "Use snapshots.", 0.5)];
        let prompt = build_prompt("how to back up data", &context);

        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.contains("User question: how to back up data"));
        assert!(prompt.contains("Use snapshots."));
    }

    #[test]
    fn similarity_is_formatted_to_three_decimals() {
        let context = vec![doc(1, "t", "p", 0.25)];
        let prompt = build_prompt("q", &context);
        assert!(prompt.contains("similarity 0.250"));
    }
}
