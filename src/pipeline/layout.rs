//! Layout engine, pass 1: measurement and pagination.
//!
//! Layout is two explicit passes. This module is the first: it measures each
//! paragraph's wrapped height under the configured geometry and assigns
//! paragraphs to pages, producing nothing but the assignment. Pass 2
//! (`crate::render::annotated`) re-walks the assignment and does the actual
//! placement and drawing, recomputing the same wrap — both passes call the
//! same pure functions, so they cannot disagree.
//!
//! Pagination invariants:
//!
//! * Paragraphs keep global order; a paragraph never splits across pages.
//! * A paragraph that would cross the bottom margin closes the current page
//!   first — unless the page is still empty, in which case it is placed
//!   regardless of overflow. A paragraph taller than the whole page
//!   therefore occupies one page alone instead of looping forever.
//! * No produced page is empty; zero input paragraphs yield zero pages.

use crate::config::PageGeometry;
use crate::render::font::{char_width, Face};
use std::ops::Range;
use tracing::{debug, warn};

/// One page of the pass-1 assignment: indices into the document's paragraph
/// sequence, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-indexed page number.
    pub number: usize,
    /// Indices of the paragraphs assigned to this page.
    pub paragraphs: Vec<usize>,
}

/// Break a paragraph into line byte-ranges at the given column width.
///
/// Greedy word wrap: words are packed until the next one would cross
/// `width`, interior newlines are hard breaks, and a single word wider than
/// the column is split character-wise rather than overflowing. The returned
/// ranges index into `text` and never start or end inside a UTF-8 code point.
pub fn wrap_lines(text: &str, face: Face, size: f32, width: f32) -> Vec<Range<usize>> {
    let mut lines = Vec::new();

    for hard in split_hard_lines(text) {
        let segment = &text[hard.clone()];
        if segment.trim().is_empty() {
            continue;
        }
        wrap_segment(text, hard.start, segment, face, size, width, &mut lines);
    }

    lines
}

/// Byte ranges of `\n`-separated segments.
fn split_hard_lines(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            ranges.push(start..i);
            start = i + 1;
        }
    }
    ranges.push(start..text.len());
    ranges
}

fn wrap_segment(
    text: &str,
    base: usize,
    segment: &str,
    face: Face,
    size: f32,
    width: f32,
    lines: &mut Vec<Range<usize>>,
) {
    let space_w = char_width(face, ' ') as f32 * size / 1000.0;

    // (start, end) byte ranges of whitespace-separated words, absolute.
    let words = segment.split_whitespace().map(|w| {
        let off = w.as_ptr() as usize - segment.as_ptr() as usize;
        (base + off, base + off + w.len())
    });

    let mut line_start: Option<usize> = None;
    let mut line_end = 0usize;
    let mut line_width = 0.0f32;

    for (w_start, w_end) in words {
        let word = &text[w_start..w_end];
        let word_w = measure_str(face, word, size);

        if word_w > width {
            // Oversized word: flush the current line, then hard-split it.
            if let Some(start) = line_start.take() {
                lines.push(start..line_end);
            }
            split_long_word(text, w_start, w_end, face, size, width, lines);
            line_width = 0.0;
            continue;
        }

        match line_start {
            None => {
                line_start = Some(w_start);
                line_end = w_end;
                line_width = word_w;
            }
            Some(start) => {
                if line_width + space_w + word_w > width {
                    lines.push(start..line_end);
                    line_start = Some(w_start);
                    line_end = w_end;
                    line_width = word_w;
                } else {
                    line_end = w_end;
                    line_width += space_w + word_w;
                }
            }
        }
    }

    if let Some(start) = line_start {
        lines.push(start..line_end);
    }
}

/// Character-wise split for a word wider than the column.
fn split_long_word(
    text: &str,
    start: usize,
    end: usize,
    face: Face,
    size: f32,
    width: f32,
    lines: &mut Vec<Range<usize>>,
) {
    let mut chunk_start = start;
    let mut chunk_width = 0.0f32;

    for (off, c) in text[start..end].char_indices() {
        let abs = start + off;
        let w = char_width(face, c) as f32 * size / 1000.0;
        if chunk_width + w > width && abs > chunk_start {
            lines.push(chunk_start..abs);
            chunk_start = abs;
            chunk_width = 0.0;
        }
        chunk_width += w;
    }
    if chunk_start < end {
        lines.push(chunk_start..end);
    }
}

fn measure_str(face: Face, s: &str, size: f32) -> f32 {
    s.chars().map(|c| char_width(face, c) as f32).sum::<f32>() * size / 1000.0
}

/// Rendered height of a paragraph under the given geometry.
///
/// Pure function of the text and geometry: wrapped line count times body
/// leading. Pass 2 computes identical line breaks, so a height measured here
/// is exactly the vertical space the paragraph occupies when drawn.
pub fn measure(text: &str, geometry: &PageGeometry) -> f32 {
    let lines = wrap_lines(text, Face::Helvetica, geometry.body_size, geometry.content_width());
    lines.len() as f32 * geometry.body_leading
}

/// Assign paragraphs to pages (pass 1).
///
/// A running vertical cursor starts at the top content edge of a fresh page;
/// a paragraph whose height would cross the bottom edge closes the page —
/// unless the page is still empty, in which case the paragraph is placed
/// anyway (visual overflow beats dropped content or an infinite loop).
pub fn paginate(paragraphs: &[String], geometry: &PageGeometry) -> Vec<Page> {
    let mut pages: Vec<Page> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut cursor = geometry.content_top();

    for (idx, text) in paragraphs.iter().enumerate() {
        let height = measure(text, geometry);

        if cursor - height < geometry.content_bottom() && !current.is_empty() {
            pages.push(Page {
                number: pages.len() + 1,
                paragraphs: std::mem::take(&mut current),
            });
            cursor = geometry.content_top();
        }

        if height > geometry.content_top() - geometry.content_bottom() {
            warn!(
                "Paragraph {} is taller than a full page ({:.0}pt); placing with overflow",
                idx + 1,
                height
            );
        }

        current.push(idx);
        cursor -= height + geometry.para_gap;
    }

    if !current.is_empty() {
        pages.push(Page {
            number: pages.len() + 1,
            paragraphs: current,
        });
    }

    debug!("Pass 1: {} paragraphs over {} pages", paragraphs.len(), pages.len());
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> PageGeometry {
        PageGeometry::default()
    }

    fn para(n: usize) -> String {
        "word ".repeat(n).trim_end().to_string()
    }

    #[test]
    fn wrap_single_short_line() {
        let lines = wrap_lines("hello world", Face::Helvetica, 11.0, 378.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(&"hello world"[lines[0].clone()], "hello world");
    }

    #[test]
    fn wrap_breaks_at_width() {
        let text = para(60);
        let lines = wrap_lines(&text, Face::Helvetica, 11.0, 100.0);
        assert!(lines.len() > 1);
        // Every line's text must be a sequence of whole words.
        for r in &lines {
            let line = &text[r.clone()];
            assert!(!line.starts_with(' ') && !line.ends_with(' '), "line {line:?}");
        }
    }

    #[test]
    fn wrap_covers_every_word_in_order() {
        let text = para(40);
        let lines = wrap_lines(&text, Face::Helvetica, 11.0, 120.0);
        let rebuilt: Vec<&str> = lines
            .iter()
            .flat_map(|r| text[r.clone()].split_whitespace())
            .collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn wrap_hard_breaks_on_newline() {
        let lines = wrap_lines("one\ntwo", Face::Helvetica, 11.0, 378.0);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn wrap_splits_oversized_word() {
        let text = "x".repeat(400);
        let lines = wrap_lines(&text, Face::Helvetica, 11.0, 100.0);
        assert!(lines.len() > 1);
        let total: usize = lines.iter().map(|r| r.len()).sum();
        assert_eq!(total, 400);
    }

    #[test]
    fn measure_is_line_count_times_leading() {
        let g = geometry();
        let h = measure("short", &g);
        assert_eq!(h, g.body_leading);
    }

    #[test]
    fn paginate_zero_paragraphs_zero_pages() {
        assert!(paginate(&[], &geometry()).is_empty());
    }

    #[test]
    fn paginate_preserves_order_and_never_splits() {
        let paras: Vec<String> = (0..40).map(|_| para(120)).collect();
        let pages = paginate(&paras, &geometry());
        assert!(pages.len() > 1);

        let flattened: Vec<usize> = pages.iter().flat_map(|p| p.paragraphs.clone()).collect();
        let expected: Vec<usize> = (0..paras.len()).collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn paginate_no_empty_pages() {
        let paras: Vec<String> = (0..25).map(|_| para(200)).collect();
        for page in paginate(&paras, &geometry()) {
            assert!(!page.paragraphs.is_empty());
        }
    }

    #[test]
    fn paginate_is_deterministic() {
        let paras: Vec<String> = (0..30).map(|i| para(50 + i * 7)).collect();
        let a = paginate(&paras, &geometry());
        let b = paginate(&paras, &geometry());
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_paragraph_gets_its_own_page() {
        // Tall enough to exceed the whole content height on its own.
        let giant = para(4000);
        let paras = vec![para(10), giant, para(10)];
        let pages = paginate(&paras, &geometry());

        let giant_page = pages
            .iter()
            .find(|p| p.paragraphs.contains(&1))
            .expect("giant paragraph must be placed");
        assert_eq!(giant_page.paragraphs, vec![1], "oversized paragraph is alone on its page");
        // The paragraph after it starts a fresh page.
        let next_page = pages.iter().find(|p| p.paragraphs.contains(&2)).unwrap();
        assert_ne!(next_page.number, giant_page.number);
    }

    #[test]
    fn overflow_boundary_matches_cursor_rule() {
        // Build paragraphs of one known height and check the per-page count
        // matches the cursor arithmetic exactly.
        let g = geometry();
        let one_line = "tiny".to_string();
        let per_para = g.body_leading + g.para_gap;
        let usable = g.content_top() - g.content_bottom();
        // Cursor rule places paragraph k if cursor - h >= bottom before it.
        let mut fit = 0usize;
        let mut cursor = usable;
        loop {
            if cursor - g.body_leading < 0.0 && fit > 0 {
                break;
            }
            fit += 1;
            cursor -= per_para;
        }

        let paras: Vec<String> = (0..fit + 3).map(|_| one_line.clone()).collect();
        let pages = paginate(&paras, &g);
        assert_eq!(pages[0].paragraphs.len(), fit);
        assert_eq!(pages[1].paragraphs.len(), 3);
    }
}
