//! DOCX text extraction.
//!
//! A DOCX file is a ZIP archive whose body lives in `word/document.xml`.
//! Extraction walks that XML with a streaming reader: `<w:p>` elements become
//! paragraphs (joined with blank lines so the segmenter sees the same
//! boundaries a plain-text source would have), `<w:t>` runs contribute their
//! text, and `<w:br>`/`<w:tab>` become a newline and a tab. Everything else —
//! styling, tables' structure, images — is ignored; only the flowed text
//! survives.

use crate::error::KeywordifyError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::debug;

/// Extract plain text from DOCX bytes, paragraphs separated by blank lines.
pub fn extract_text(bytes: &[u8]) -> Result<String, KeywordifyError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| KeywordifyError::DocxParseFailed(format!("not a readable ZIP archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| KeywordifyError::DocxParseFailed("word/document.xml is missing".into()))?
        .read_to_string(&mut xml)
        .map_err(|e| KeywordifyError::DocxParseFailed(format!("document.xml unreadable: {e}")))?;

    let paragraphs = parse_document_xml(&xml)?;
    debug!("Extracted {} paragraphs from DOCX body", paragraphs.len());
    Ok(paragraphs.join("\n\n"))
}

/// Walk `document.xml` and collect paragraph texts.
fn parse_document_xml(xml: &str) -> Result<Vec<String>, KeywordifyError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if in_paragraph => match e.local_name().as_ref() {
                b"br" => current.push('\n'),
                b"tab" => current.push('\t'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| {
                    KeywordifyError::DocxParseFailed(format!("bad text run: {e}"))
                })?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = false;
                    if !current.trim().is_empty() {
                        paragraphs.push(current.trim().to_string());
                    }
                    current.clear();
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(KeywordifyError::DocxParseFailed(format!(
                    "XML error at offset {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_with_body(body_xml: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{body_xml}</w:body></w:document>"#
        );

        let mut buf = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(&mut buf);
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        zip.finish().unwrap();
        buf.into_inner()
    }

    #[test]
    fn extracts_paragraphs_separated_by_blank_lines() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second paragraph.</w:t></w:r></w:p>",
        );
        let text = extract_text(&bytes).unwrap();
        assert_eq!(text, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn joins_runs_within_a_paragraph() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Split </w:t></w:r><w:r><w:t>across runs.</w:t></w:r></w:p>",
        );
        assert_eq!(extract_text(&bytes).unwrap(), "Split across runs.");
    }

    #[test]
    fn line_break_becomes_soft_newline() {
        let bytes = docx_with_body("<w:p><w:r><w:t>one</w:t><w:br/><w:t>two</w:t></w:r></w:p>");
        assert_eq!(extract_text(&bytes).unwrap(), "one\ntwo");
    }

    #[test]
    fn empty_paragraphs_are_dropped() {
        let bytes = docx_with_body(
            "<w:p></w:p><w:p><w:r><w:t>only one</w:t></w:r></w:p><w:p><w:r><w:t> </w:t></w:r></w:p>",
        );
        assert_eq!(extract_text(&bytes).unwrap(), "only one");
    }

    #[test]
    fn entities_are_unescaped() {
        let bytes = docx_with_body("<w:p><w:r><w:t>salt &amp; pepper</w:t></w:r></w:p>");
        assert_eq!(extract_text(&bytes).unwrap(), "salt & pepper");
    }

    #[test]
    fn missing_document_xml_is_an_error() {
        let mut buf = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(&mut buf);
        zip.start_file("word/other.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<x/>").unwrap();
        zip.finish().unwrap();

        let err = extract_text(&buf.into_inner()).unwrap_err();
        assert!(matches!(err, KeywordifyError::DocxParseFailed(_)));
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        let err = extract_text(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, KeywordifyError::DocxParseFailed(_)));
    }
}
