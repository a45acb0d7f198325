//! Pass 2 for the annotated-content artifact.
//!
//! Re-walks the pass-1 page assignment and draws each paragraph at its
//! computed offset, using the same wrap the measurement pass produced.
//! Highlight spans switch the affected run to bold red; a paragraph's margin
//! note is drawn in the left gutter, bold blue, baseline-aligned with the
//! paragraph's first line and truncated to the gutter width.

use crate::config::PageGeometry;
use crate::pipeline::highlight::{line_runs, HighlightSpan};
use crate::pipeline::layout::{wrap_lines, Page};
use crate::render::font::{text_width, truncate_to_width, Face};
use crate::render::{win_ansi, DocBuilder, FONT_BOLD, FONT_REGULAR};
use pdf_writer::{Content, Str};

const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const HIGHLIGHT_RED: (f32, f32, f32) = (0.8, 0.0, 0.0);
const NOTE_BLUE: (f32, f32, f32) = (0.0, 0.0, 0.8);

/// Per-paragraph pass-2 decisions, parallel to the document's paragraphs.
#[derive(Debug, Clone, Default)]
pub struct ParagraphAnnotation {
    /// Non-overlapping highlight spans, sorted by start offset.
    pub spans: Vec<HighlightSpan>,
    /// The gutter call-out, if this paragraph earned one.
    pub note: Option<String>,
}

/// Draw the annotated-content document.
///
/// `annotations` is indexed by paragraph number like `paragraphs`. An empty
/// page assignment still produces one blank page, so the artifact is always
/// a valid document.
pub fn render_annotated(
    paragraphs: &[String],
    pages: &[Page],
    annotations: &[ParagraphAnnotation],
    geometry: &PageGeometry,
) -> Vec<u8> {
    let mut doc = DocBuilder::new();

    if pages.is_empty() {
        doc.push_page(Content::new(), geometry);
        return doc.finish();
    }

    for page in pages {
        let mut content = Content::new();
        let mut cursor = geometry.content_top();

        for &idx in &page.paragraphs {
            let text = &paragraphs[idx];
            let annotation = annotations.get(idx).cloned().unwrap_or_default();

            let lines = wrap_lines(text, Face::Helvetica, geometry.body_size, geometry.content_width());
            let first_baseline = cursor - geometry.body_size;

            if let Some(note) = &annotation.note {
                draw_margin_note(&mut content, note, first_baseline, geometry);
            }

            let mut baseline = first_baseline;
            for line in &lines {
                draw_line(&mut content, text, line.clone(), &annotation.spans, baseline, geometry);
                baseline -= geometry.body_leading;
            }

            cursor -= lines.len() as f32 * geometry.body_leading + geometry.para_gap;
        }

        doc.push_page(content, geometry);
    }

    doc.finish()
}

/// Draw one wrapped line as a sequence of styled runs.
fn draw_line(
    content: &mut Content,
    text: &str,
    line: std::ops::Range<usize>,
    spans: &[HighlightSpan],
    baseline: f32,
    geometry: &PageGeometry,
) {
    let mut x = geometry.content_x();

    content.begin_text();
    for run in line_runs(text, line, spans) {
        let (face, name, colour) = if run.emphasis {
            (Face::HelveticaBold, FONT_BOLD, HIGHLIGHT_RED)
        } else {
            (Face::Helvetica, FONT_REGULAR, BLACK)
        };

        content.set_font(name, geometry.body_size);
        content.set_fill_rgb(colour.0, colour.1, colour.2);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, baseline]);
        content.show(Str(&win_ansi(run.text)));

        x += text_width(face, run.text, geometry.body_size);
    }
    content.end_text();
}

/// Draw a gutter call-out aligned with the paragraph's first baseline.
fn draw_margin_note(content: &mut Content, note: &str, baseline: f32, geometry: &PageGeometry) {
    let fitted = truncate_to_width(Face::HelveticaBold, note, geometry.note_size, geometry.gutter_width);

    content.begin_text();
    content.set_font(FONT_BOLD, geometry.note_size);
    content.set_fill_rgb(NOTE_BLUE.0, NOTE_BLUE.1, NOTE_BLUE.2);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, geometry.margin, baseline]);
    content.show(Str(&win_ansi(&fitted)));
    content.end_text();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::highlight::highlight_spans;
    use crate::pipeline::layout::paginate;

    fn geometry() -> PageGeometry {
        PageGeometry::default()
    }

    fn render_simple(paragraphs: &[&str], keywords: &[&str]) -> Vec<u8> {
        let paras: Vec<String> = paragraphs.iter().map(|s| s.to_string()).collect();
        let kws: Vec<String> = keywords.iter().map(|s| s.to_string()).collect();
        let pages = paginate(&paras, &geometry());
        let annotations: Vec<ParagraphAnnotation> = paras
            .iter()
            .map(|p| ParagraphAnnotation {
                spans: highlight_spans(p, &kws),
                note: None,
            })
            .collect();
        render_annotated(&paras, &pages, &annotations, &geometry())
    }

    #[test]
    fn produces_pdf_bytes() {
        let bytes = render_simple(&["Alpha beta gamma."], &["alpha"]);
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn empty_document_yields_one_blank_page() {
        let bytes = render_annotated(&[], &[], &[], &geometry());
        assert!(bytes.starts_with(b"%PDF"));
        // One page object in the tree.
        assert!(bytes.windows(8).any(|w| w == b"/Count 1"));
    }

    #[test]
    fn page_count_matches_assignment() {
        let paras: Vec<String> = (0..60).map(|i| format!("Paragraph {} body text. ", i).repeat(20)).collect();
        let pages = paginate(&paras, &geometry());
        assert!(pages.len() > 1);

        let annotations = vec![ParagraphAnnotation::default(); paras.len()];
        let bytes = render_annotated(&paras, &pages, &annotations, &geometry());
        let marker = format!("/Count {}", pages.len());
        assert!(
            bytes.windows(marker.len()).any(|w| w == marker.as_bytes()),
            "expected {marker} in page tree"
        );
    }

    #[test]
    fn registers_both_faces() {
        let bytes = render_simple(&["Alpha."], &["alpha"]);
        assert!(bytes.windows(10).any(|w| w == b"/Helvetica"));
        assert!(bytes.windows(15).any(|w| w == b"/Helvetica-Bold"));
    }
}
