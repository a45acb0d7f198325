//! The keyword-index artifact: a 3-column bullet list.
//!
//! Keywords fill column 1 top to bottom, then column 2, then column 3; a
//! full page (3 × 30 entries) starts a new one. Entries too wide for the
//! column are truncated with an ellipsis. Pages carry a centred page number
//! only when there is more than one.

use crate::config::PageGeometry;
use crate::render::font::{text_width, truncate_to_width, Face};
use crate::render::{win_ansi, DocBuilder, FONT_BOLD, FONT_REGULAR};
use pdf_writer::{Content, Str};

const TITLE: &str = "Keywords (in order of appearance)";
const TITLE_SIZE: f32 = 14.0;
const ENTRY_SIZE: f32 = 11.0;
const PAGE_NUM_SIZE: f32 = 9.0;
const BULLET: &str = "\u{2022} ";

/// Number of columns on an index page.
const COLUMNS: usize = 3;

/// The (page, column, row) slot of the i-th keyword.
fn slot(i: usize, geometry: &PageGeometry) -> (usize, usize, usize) {
    let rows = geometry.index_rows_per_column;
    let per_page = COLUMNS * rows;
    (i / per_page, (i % per_page) / rows, i % rows)
}

/// Draw the keyword-index document from the finalized ledger sequence.
///
/// An empty sequence still yields a single page carrying the title.
pub fn render_index(keywords: &[String], geometry: &PageGeometry) -> Vec<u8> {
    let per_page = COLUMNS * geometry.index_rows_per_column;
    let page_count = if keywords.is_empty() {
        1
    } else {
        keywords.len().div_ceil(per_page)
    };

    let title_baseline = geometry.page_height - geometry.margin - TITLE_SIZE;
    let first_row_baseline = title_baseline - 2.0 * geometry.index_line_height;

    let mut doc = DocBuilder::new();

    for page in 0..page_count {
        let mut content = Content::new();

        content.begin_text();
        content.set_font(FONT_BOLD, TITLE_SIZE);
        content.set_fill_rgb(0.0, 0.0, 0.0);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, geometry.margin, title_baseline]);
        content.show(Str(&win_ansi(TITLE)));
        content.end_text();

        let start = page * per_page;
        let end = (start + per_page).min(keywords.len());
        for (i, keyword) in keywords[start..end].iter().enumerate() {
            let (_, column, row) = slot(start + i, geometry);
            let x = geometry.margin
                + column as f32 * (geometry.index_column_width() + geometry.index_column_gap);
            let y = first_row_baseline - row as f32 * geometry.index_line_height;

            draw_entry(&mut content, keyword, x, y, geometry);
        }

        if page_count > 1 {
            draw_page_number(&mut content, page + 1, geometry);
        }

        doc.push_page(content, geometry);
    }

    doc.finish()
}

fn draw_entry(content: &mut Content, keyword: &str, x: f32, y: f32, geometry: &PageGeometry) {
    let bullet_w = text_width(Face::Helvetica, BULLET, ENTRY_SIZE);
    let fitted = truncate_to_width(
        Face::Helvetica,
        keyword,
        ENTRY_SIZE,
        geometry.index_column_width() - bullet_w,
    );

    content.begin_text();
    content.set_font(FONT_REGULAR, ENTRY_SIZE);
    content.set_fill_rgb(0.0, 0.0, 0.0);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
    let mut line = BULLET.to_string();
    line.push_str(&fitted);
    content.show(Str(&win_ansi(&line)));
    content.end_text();
}

fn draw_page_number(content: &mut Content, number: usize, geometry: &PageGeometry) {
    let label = format!("Page {number}");
    let x = (geometry.page_width - text_width(Face::Helvetica, &label, PAGE_NUM_SIZE)) / 2.0;

    content.begin_text();
    content.set_font(FONT_REGULAR, PAGE_NUM_SIZE);
    content.set_fill_rgb(0.0, 0.0, 0.0);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, geometry.margin / 2.0]);
    content.show(Str(&win_ansi(&label)));
    content.end_text();
}

/// Number of index pages a keyword count will occupy.
pub fn index_page_count(keyword_count: usize, geometry: &PageGeometry) -> usize {
    if keyword_count == 0 {
        1
    } else {
        keyword_count.div_ceil(COLUMNS * geometry.index_rows_per_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> PageGeometry {
        PageGeometry::default()
    }

    fn kws(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("keyword {i}")).collect()
    }

    #[test]
    fn slots_fill_columns_before_pages() {
        let g = geometry();
        assert_eq!(slot(0, &g), (0, 0, 0));
        assert_eq!(slot(29, &g), (0, 0, 29));
        assert_eq!(slot(30, &g), (0, 1, 0));
        assert_eq!(slot(89, &g), (0, 2, 29));
        assert_eq!(slot(90, &g), (1, 0, 0));
    }

    #[test]
    fn empty_keywords_single_title_page() {
        let bytes = render_index(&[], &geometry());
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.windows(8).any(|w| w == b"/Count 1"));
    }

    #[test]
    fn ninety_keywords_fit_one_page() {
        assert_eq!(index_page_count(90, &geometry()), 1);
        let bytes = render_index(&kws(90), &geometry());
        assert!(bytes.windows(8).any(|w| w == b"/Count 1"));
    }

    #[test]
    fn ninety_one_keywords_overflow_to_second_page() {
        assert_eq!(index_page_count(91, &geometry()), 2);
        let bytes = render_index(&kws(91), &geometry());
        assert!(bytes.windows(8).any(|w| w == b"/Count 2"));
    }

    #[test]
    fn long_keyword_is_truncated_not_overflowed() {
        let long = vec!["an unreasonably long keyword phrase that cannot fit a column".to_string()];
        let bytes = render_index(&long, &geometry());
        assert!(bytes.starts_with(b"%PDF"));
    }
}
