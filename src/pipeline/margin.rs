//! Margin annotator: assign at most one gutter call-out per paragraph.
//!
//! Assignment is page-scoped. Each page gets a fresh consumed set, so a
//! keyword that reappears on a later page (per-page extraction) may earn a
//! fresh call-out there, while within one page no keyword is annotated twice
//! and no paragraph carries two notes.

use std::collections::HashSet;

use crate::pipeline::locate::first_match;

/// Choose margin call-outs for one page.
///
/// `paragraphs` are the page's paragraph texts in reading order and
/// `keywords` the page's keyword set in its extraction order. For each
/// paragraph the first keyword that occurs in it and has not yet been
/// consumed on this page is chosen; the result has one entry per paragraph,
/// `None` where no keyword qualified.
pub fn assign_notes(paragraphs: &[&str], keywords: &[String]) -> Vec<Option<String>> {
    let mut consumed: HashSet<String> = HashSet::new();

    paragraphs
        .iter()
        .map(|text| {
            let chosen = keywords.iter().find(|kw| {
                !consumed.contains(kw.as_str()) && first_match(text, kw).is_some()
            });
            match chosen {
                Some(kw) => {
                    consumed.insert(kw.clone());
                    Some(kw.clone())
                }
                None => None,
            }
        })
        .collect()
}
