//! Pass 2: drawing the two PDF artifacts.
//!
//! Both renderers share one low-level document builder around `pdf-writer`:
//! a catalog, a page tree, and the two standard-14 faces registered once and
//! referenced from every page's resource dictionary. Text is encoded as
//! WinAnsi, which the standard faces cover without embedding; characters
//! outside WinAnsi degrade to `?` rather than producing a broken string.
//!
//! [`annotated`] draws the flowed body with highlights and gutter notes;
//! [`index`] draws the 3-column keyword index. [`font`] holds the AFM
//! metrics both passes measure with.

pub mod annotated;
pub mod font;
pub mod index;

use crate::config::PageGeometry;
use pdf_writer::{Content, Name, Pdf, Rect, Ref};

/// Resource name of the regular face (Helvetica).
pub(crate) const FONT_REGULAR: Name<'static> = Name(b"F1");
/// Resource name of the bold face (Helvetica-Bold).
pub(crate) const FONT_BOLD: Name<'static> = Name(b"F2");

/// Minimal PDF document builder shared by both artifact renderers.
pub(crate) struct DocBuilder {
    pdf: Pdf,
    next_id: i32,
    page_tree: Ref,
    font_regular: Ref,
    font_bold: Ref,
    page_refs: Vec<Ref>,
}

impl DocBuilder {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();
        let mut next_id = 1;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog = alloc();
        let page_tree = alloc();
        let font_regular = alloc();
        let font_bold = alloc();

        pdf.catalog(catalog).pages(page_tree);
        pdf.type1_font(font_regular)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(font_bold)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        Self {
            pdf,
            next_id,
            page_tree,
            font_regular,
            font_bold,
            page_refs: Vec::new(),
        }
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    /// Append one page with the given content stream.
    pub fn push_page(&mut self, content: Content, geometry: &PageGeometry) {
        let page_ref = self.alloc();
        let content_ref = self.alloc();

        let mut page = self.pdf.page(page_ref);
        page.media_box(Rect::new(0.0, 0.0, geometry.page_width, geometry.page_height));
        page.parent(self.page_tree);
        page.contents(content_ref);
        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        fonts.pair(FONT_REGULAR, self.font_regular);
        fonts.pair(FONT_BOLD, self.font_bold);
        drop(fonts);
        drop(resources);
        drop(page);

        self.pdf.stream(content_ref, &content.finish());
        self.page_refs.push(page_ref);
    }

    /// Close the page tree and serialise the document.
    pub fn finish(mut self) -> Vec<u8> {
        let count = self.page_refs.len() as i32;
        self.pdf.pages(self.page_tree).kids(self.page_refs).count(count);
        self.pdf.finish()
    }
}

/// Encode text as WinAnsi bytes for a `show` operator.
///
/// ASCII and Latin-1 pass through; the typographic characters the pipeline
/// itself emits (ellipsis, bullet, dashes, curly quotes) map to their WinAnsi
/// code points; everything else becomes `?`.
pub(crate) fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // €
            '\u{2026}' => 0x85, // …
            '\u{2013}' => 0x96, // –
            '\u{2014}' => 0x97, // —
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95, // •
            c if (c as u32) <= 0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_passes_ascii_through() {
        assert_eq!(win_ansi("Hello."), b"Hello.");
    }

    #[test]
    fn win_ansi_maps_typographic_characters() {
        assert_eq!(win_ansi("…"), vec![0x85]);
        assert_eq!(win_ansi("•"), vec![0x95]);
    }

    #[test]
    fn win_ansi_degrades_unknown_to_question_mark() {
        assert_eq!(win_ansi("日"), b"?");
    }

    #[test]
    fn empty_document_is_valid_pdf() {
        let mut doc = DocBuilder::new();
        doc.push_page(Content::new(), &PageGeometry::default());
        let bytes = doc.finish();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
    }
}
