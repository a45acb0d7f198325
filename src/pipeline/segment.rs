//! Text segmentation: raw text → ordered paragraph units.
//!
//! A paragraph boundary is a blank line (a line that is empty or whitespace
//! after trimming). Units that are empty after trimming are discarded, so the
//! output contains only non-empty paragraphs in reading order. There are no
//! error conditions: empty input yields an empty sequence.

/// Split raw text into an ordered sequence of non-empty paragraph units.
///
/// CRLF input is tolerated; interior single newlines are preserved as soft
/// line breaks inside the unit (the layout engine rewraps anyway), while
/// leading/trailing whitespace per unit is trimmed.
pub fn segment(text: &str) -> Vec<String> {
    let normalised = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in normalised.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut paragraphs);
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    flush(&mut current, &mut paragraphs);

    paragraphs
}

fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        paragraphs.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird.";
        assert_eq!(segment(text), vec!["First paragraph.", "Second paragraph.", "Third."]);
    }

    #[test]
    fn empty_input_yields_empty_sequence() {
        assert!(segment("").is_empty());
        assert!(segment("\n\n\n").is_empty());
        assert!(segment("   \n\t\n  ").is_empty());
    }

    #[test]
    fn whitespace_only_units_are_dropped() {
        let text = "Alpha.\n\n   \n\nBeta.";
        assert_eq!(segment(text), vec!["Alpha.", "Beta."]);
    }

    #[test]
    fn multiple_blank_lines_are_one_boundary() {
        let text = "A\n\n\n\n\nB";
        assert_eq!(segment(text), vec!["A", "B"]);
    }

    #[test]
    fn interior_newlines_are_soft_breaks() {
        let text = "Line one\nline two\n\nNext unit";
        assert_eq!(segment(text), vec!["Line one\nline two", "Next unit"]);
    }

    #[test]
    fn crlf_input_is_normalised() {
        let text = "A\r\n\r\nB\r\n";
        assert_eq!(segment(text), vec!["A", "B"]);
    }

    #[test]
    fn units_are_trimmed() {
        let text = "  padded  \n\nnext";
        assert_eq!(segment(text), vec!["padded", "next"]);
    }
}
