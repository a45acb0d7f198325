//! Keyword location: verify collaborator suggestions against the actual text.
//!
//! The extraction collaborator promises order, not accuracy — a suggested
//! keyword is not guaranteed to be a verbatim substring of the scope it was
//! extracted from. Every suggestion therefore passes through [`locate`],
//! which finds the byte offset of the first case-insensitive occurrence and
//! silently drops (with a diagnostic) anything that never matches.
//!
//! Matching is done with case-insensitive literal regexes rather than a
//! lowercased haystack so that byte offsets always refer to the original
//! text, regardless of characters whose lowercase form has a different
//! UTF-8 length.

use regex::RegexBuilder;
use std::ops::Range;
use tracing::warn;

/// A verified keyword: the suggestion plus the byte offset of its first
/// case-insensitive occurrence within the scope it was located in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit {
    /// The keyword as the collaborator supplied it (display casing).
    pub keyword: String,
    /// Byte offset of the first match in the scope text.
    pub offset: usize,
}

/// Locate each candidate keyword's first occurrence in `scope_text`.
///
/// Returns hits sorted by offset (source order), one per keyword at most.
/// Candidates with no case-insensitive match are dropped with a `warn!`
/// diagnostic — the documented recovery for a collaborator suggestion that
/// is not a verbatim substring. The number of dropped candidates is returned
/// alongside for run statistics.
pub fn locate(scope_text: &str, candidates: &[String]) -> (Vec<KeywordHit>, usize) {
    let mut hits = Vec::with_capacity(candidates.len());
    let mut dropped = 0usize;

    for keyword in candidates {
        match first_match(scope_text, keyword) {
            Some(range) => hits.push(KeywordHit {
                keyword: keyword.clone(),
                offset: range.start,
            }),
            None => {
                warn!("Keyword '{}' not found in scope; dropping", keyword);
                dropped += 1;
            }
        }
    }

    hits.sort_by_key(|h| h.offset);
    (hits, dropped)
}

/// Byte range of the first case-insensitive occurrence of `keyword`, if any.
///
/// The full range is returned, not just the offset: a case-folded match can
/// occupy a different number of bytes than the keyword itself (U+212A KELVIN
/// SIGN matches `k`), so `start + keyword.len()` would not be a valid end.
pub fn first_match(text: &str, keyword: &str) -> Option<Range<usize>> {
    if keyword.is_empty() {
        return None;
    }
    let re = RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
        .ok()?;
    re.find(text).map(|m| m.range())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_first_case_insensitive_occurrence() {
        let (hits, dropped) = locate("Alpha beta gamma. alpha again.", &kws(&["alpha"]));
        assert_eq!(dropped, 0);
        assert_eq!(hits, vec![KeywordHit { keyword: "alpha".into(), offset: 0 }]);
    }

    #[test]
    fn hits_are_sorted_by_source_position() {
        let text = "Delta comes late. Alpha comes first here? No — delta was first.";
        let (hits, _) = locate(text, &kws(&["alpha", "delta"]));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].keyword, "delta");
        assert!(hits[0].offset < hits[1].offset);
    }

    #[test]
    fn missing_keyword_is_dropped_silently() {
        let (hits, dropped) = locate("Alpha beta.", &kws(&["alpha", "xylophone"]));
        assert_eq!(hits.len(), 1);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn keyword_with_regex_metacharacters_is_literal() {
        let text = "Cost is $5 (roughly).";
        let (hits, dropped) = locate(text, &kws(&["$5 (roughly)"]));
        assert_eq!(dropped, 0);
        assert_eq!(hits[0].offset, 8);
    }

    #[test]
    fn multi_word_keyword_matches() {
        let text = "We study neural networks here.";
        assert_eq!(first_match(text, "Neural Networks"), Some(9..24));
    }

    #[test]
    fn case_folded_match_reports_its_own_width() {
        // U+212A KELVIN SIGN is 3 bytes but case-folds to "k".
        let text = "Temp in \u{212A} units";
        assert_eq!(first_match(text, "k"), Some(8..11));
    }

    #[test]
    fn empty_candidates_and_empty_text() {
        let (hits, dropped) = locate("", &kws(&["alpha"]));
        assert!(hits.is_empty());
        assert_eq!(dropped, 1);

        let (hits, dropped) = locate("text", &[]);
        assert!(hits.is_empty());
        assert_eq!(dropped, 0);
    }

    #[test]
    fn empty_keyword_never_matches() {
        assert_eq!(first_match("text", ""), None);
    }
}
