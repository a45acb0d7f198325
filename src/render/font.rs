//! Font metrics for the standard-14 faces used by both artifacts.
//!
//! The layout engine needs text widths long before anything is drawn, so the
//! AFM advance widths for Helvetica and Helvetica-Bold live here as plain
//! data, with no dependency on the PDF backend. Widths are in 1/1000 of the
//! font size, per the Adobe AFM files for the standard 14 fonts.
//!
//! Non-WinAnsi characters fall back to a nominal width; the measurement is
//! then slightly wrong for exotic input, which costs a marginally short line,
//! never a crash or an overlap.

/// The two faces the renderers register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Helvetica,
    HelveticaBold,
}

/// Fallback advance width for characters outside the table.
const DEFAULT_WIDTH: u16 = 556;

/// Helvetica advance widths for ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Advance width of one character in 1/1000 font-size units.
pub fn char_width(face: Face, c: char) -> u16 {
    let table = match face {
        Face::Helvetica => &HELVETICA,
        Face::HelveticaBold => &HELVETICA_BOLD,
    };
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        table[(code - 0x20) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Width of a string in points at the given font size.
pub fn text_width(face: Face, text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(face, c) as u32).sum();
    units as f32 * size / 1000.0
}

/// Truncate `text` so that it fits in `max_width` points, appending an
/// ellipsis when anything was cut. Returns the text unchanged when it fits.
pub fn truncate_to_width(face: Face, text: &str, size: f32, max_width: f32) -> String {
    if text_width(face, text, size) <= max_width {
        return text.to_string();
    }

    const ELLIPSIS: char = '…';
    let ellipsis_w = char_width(face, ELLIPSIS) as f32 * size / 1000.0;
    let budget = max_width - ellipsis_w;

    let mut width = 0.0;
    let mut out = String::new();
    for c in text.chars() {
        let w = char_width(face, c) as f32 * size / 1000.0;
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    // Don't end on trailing whitespace before the ellipsis.
    while out.ends_with(' ') {
        out.pop();
    }
    out.push(ELLIPSIS);
    out
}
