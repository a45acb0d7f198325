//! Prompts for LLM-based keyword extraction.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tuning what counts as a keyword (or how
//!    the exclude list is phrased) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    spinning up a real LLM, making prompt regressions easy to catch.
//!
//! The collaborator contract matters more than the wording: the response must
//! be a bare comma-separated list, because [`crate::extract::parse_keywords`]
//! accepts nothing else.

/// System message framing the extraction task.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts key concepts from documents.";

/// Build the user prompt for one extraction call.
///
/// `exclude` lists keywords the collaborator should not repeat (used in
/// per-page mode when `exclude_seen` is enabled); empty means no restriction.
pub fn extraction_prompt(
    text: &str,
    min_keywords: usize,
    max_keywords: usize,
    exclude: &[String],
) -> String {
    let exclude_clause = if exclude.is_empty() {
        String::new()
    } else {
        format!(
            "\nDo NOT return any of these already-used keywords: {}.\n",
            exclude.join(", ")
        )
    };

    format!(
        r#"Analyze this document and extract {min_keywords}-{max_keywords} keywords that:
1. Represent the most important concepts or topics
2. Are contextually significant (not just frequent words)
3. Would help someone quickly understand the document's key themes
4. Are unique and non-overlapping
5. Appear verbatim in the document text
{exclude_clause}
IMPORTANT: Return ONLY the keywords as a comma-separated list, nothing else.
Example format: keyword1, keyword2, keyword3

Document:
{text}

Keywords:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_bounds() {
        let p = extraction_prompt("Some text.", 3, 5, &[]);
        assert!(p.contains("3-5 keywords"));
        assert!(p.contains("Some text."));
        assert!(!p.contains("already-used"));
    }

    #[test]
    fn prompt_lists_exclusions() {
        let excl = vec!["alpha".to_string(), "beta".to_string()];
        let p = extraction_prompt("Text.", 3, 5, &excl);
        assert!(p.contains("alpha, beta"));
    }
}
