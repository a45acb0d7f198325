//! Highlight rendering: mark the first occurrence of each keyword.
//!
//! The renderer never splices markup into the paragraph string. It computes
//! all match spans against the *original* text first — so a span can never
//! land inside previously inserted markup and offsets never drift — and then
//! represents the paragraph as styled runs. Each keyword is applied exactly
//! once per paragraph (first case-insensitive match only), overlapping spans
//! are resolved in favour of the earlier one, and the matched substring keeps
//! its original casing.
//!
//! [`mark_keywords`] is the plain-text face of the same logic (`**…**`
//! emphasis markers), used by diagnostics and tests; it additionally refuses
//! to re-wrap a span that already carries markers, which makes it idempotent
//! on its own output.

use crate::pipeline::locate::first_match;
use std::ops::Range;

/// Emphasis marker used by the plain-text markup form.
const MARK: &str = "**";

/// One keyword's highlight region within a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Byte range of the matched substring in the original paragraph text.
    pub range: Range<usize>,
    /// The keyword that produced the match (collaborator casing).
    pub keyword: String,
}

/// A fragment of paragraph text with a single style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub emphasis: bool,
}

/// Compute non-overlapping highlight spans for a paragraph.
///
/// For each keyword with a case-insensitive occurrence in `text`, the first
/// match is taken; keywords without a match contribute nothing (the page-level
/// locator has already logged those). Spans are returned sorted by start, and
/// a span overlapping an earlier one is discarded so no byte is emphasised
/// twice.
pub fn highlight_spans(text: &str, keywords: &[String]) -> Vec<HighlightSpan> {
    let mut spans: Vec<HighlightSpan> = keywords
        .iter()
        .filter_map(|kw| {
            // The matched range may be wider or narrower than the keyword
            // (case folding), so the span takes the match's own bounds.
            first_match(text, kw).map(|range| HighlightSpan {
                range,
                keyword: kw.clone(),
            })
        })
        .collect();

    spans.sort_by_key(|s| s.range.start);

    let mut kept: Vec<HighlightSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match kept.last() {
            Some(prev) if span.range.start < prev.range.end => {} // overlap, earlier span wins
            _ => kept.push(span),
        }
    }
    kept
}

/// Split one wrapped line into styled runs.
///
/// `line` is a byte range into the paragraph text (from the layout engine's
/// wrap); spans partially covered by the line are clipped to it, so a
/// keyword broken across two lines is emphasised on both.
pub fn line_runs<'a>(text: &'a str, line: Range<usize>, spans: &[HighlightSpan]) -> Vec<TextRun<'a>> {
    let mut runs = Vec::new();
    let mut cursor = line.start;

    for span in spans {
        let start = span.range.start.max(line.start);
        let end = span.range.end.min(line.end);
        if start >= end {
            continue;
        }
        if start > cursor {
            runs.push(TextRun {
                text: &text[cursor..start],
                emphasis: false,
            });
        }
        runs.push(TextRun {
            text: &text[start..end],
            emphasis: true,
        });
        cursor = end;
    }

    if cursor < line.end {
        runs.push(TextRun {
            text: &text[cursor..line.end],
            emphasis: false,
        });
    }

    runs
}

/// Plain-text form: wrap the first occurrence of each keyword in `**…**`.
///
/// Idempotent per keyword per paragraph: a match whose span is already
/// wrapped in markers is left alone, so running the function on its own
/// output adds nothing.
pub fn mark_keywords(text: &str, keywords: &[String]) -> String {
    let mut spans: Vec<HighlightSpan> = Vec::new();

    for kw in keywords {
        if let Some(range) = first_match(text, kw) {
            if already_marked(text, range.start, range.end) {
                continue;
            }
            if spans
                .iter()
                .any(|s| range.start < s.range.end && s.range.start < range.end)
            {
                continue;
            }
            spans.push(HighlightSpan {
                range,
                keyword: kw.clone(),
            });
        }
    }

    spans.sort_by_key(|s| s.range.start);

    let mut out = String::with_capacity(text.len() + spans.len() * 2 * MARK.len());
    let mut cursor = 0;
    for span in &spans {
        out.push_str(&text[cursor..span.range.start]);
        out.push_str(MARK);
        out.push_str(&text[span.range.clone()]);
        out.push_str(MARK);
        cursor = span.range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn already_marked(text: &str, start: usize, end: usize) -> bool {
    start >= MARK.len()
        && text[..start].ends_with(MARK)
        && text[end..].starts_with(MARK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn marks_first_occurrence_preserving_case() {
        let marked = mark_keywords("Alpha beta gamma.", &kws(&["alpha"]));
        assert_eq!(marked, "**Alpha** beta gamma.");
    }

    #[test]
    fn repeated_word_marked_once() {
        let marked = mark_keywords("alpha and alpha again", &kws(&["alpha"]));
        assert_eq!(marked, "**alpha** and alpha again");
    }

    #[test]
    fn empty_keyword_list_returns_text_unchanged() {
        assert_eq!(mark_keywords("plain text", &[]), "plain text");
    }

    #[test]
    fn absent_keyword_changes_nothing() {
        assert_eq!(mark_keywords("plain text", &kws(&["xylophone"])), "plain text");
    }

    #[test]
    fn idempotent_on_own_output() {
        let keywords = kws(&["alpha", "delta"]);
        let once = mark_keywords("Alpha beta. Delta epsilon.", &keywords);
        let twice = mark_keywords(&once, &keywords);
        assert_eq!(once, twice);
    }

    #[test]
    fn spans_sorted_and_non_overlapping() {
        let text = "machine learning of machines";
        let spans = highlight_spans(text, &kws(&["machine learning", "machine"]));
        // "machine" first-matches inside "machine learning"; the overlap is dropped.
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].keyword, "machine learning");
    }

    #[test]
    fn spans_use_original_offsets() {
        let text = "Alpha beta delta.";
        let spans = highlight_spans(text, &kws(&["delta", "alpha"]));
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].range, 0..5);
        assert_eq!(&text[spans[1].range.clone()], "delta");
    }

    #[test]
    fn line_runs_split_around_span() {
        let text = "Alpha beta gamma";
        let spans = highlight_spans(text, &kws(&["beta"]));
        let runs = line_runs(text, 0..text.len(), &spans);
        let rendered: Vec<(&str, bool)> = runs.iter().map(|r| (r.text, r.emphasis)).collect();
        assert_eq!(
            rendered,
            vec![("Alpha ", false), ("beta", true), (" gamma", false)]
        );
    }

    #[test]
    fn line_runs_clip_span_at_line_boundary() {
        let text = "alphabet";
        let spans = vec![HighlightSpan {
            range: 2..6,
            keyword: "phab".into(),
        }];
        let runs = line_runs(text, 0..4, &spans);
        assert_eq!(
            runs,
            vec![
                TextRun { text: "al", emphasis: false },
                TextRun { text: "ph", emphasis: true },
            ]
        );
    }

    #[test]
    fn case_folded_match_marks_the_whole_character() {
        // U+212A KELVIN SIGN case-folds to "k" but is 3 bytes wide; the span
        // must cover the full match, never split the code point.
        let marked = mark_keywords("Temp in \u{212A} units", &kws(&["k"]));
        assert_eq!(marked, "Temp in **\u{212A}** units");
    }

    #[test]
    fn case_folded_span_yields_valid_line_runs() {
        let text = "Temp in \u{212A} units";
        let spans = highlight_spans(text, &kws(&["k"]));
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].range.clone()], "\u{212A}");

        let runs = line_runs(text, 0..text.len(), &spans);
        let emphasised: Vec<&str> = runs.iter().filter(|r| r.emphasis).map(|r| r.text).collect();
        assert_eq!(emphasised, vec!["\u{212A}"]);
    }

    #[test]
    fn line_runs_without_spans_is_single_plain_run() {
        let text = "no keywords here";
        let runs = line_runs(text, 0..text.len(), &[]);
        assert_eq!(runs.len(), 1);
        assert!(!runs[0].emphasis);
    }
}
