//! Full-document annotation entry points.
//!
//! The pipeline is strictly sequential: pass-1 layout first, then one page
//! at a time through extraction, location, highlighting, margin assignment
//! and the ledger, then both artifacts are drawn. The only latency and the
//! only recoverable failure live in the keyword-collaborator call; a page
//! whose extraction fails is rendered with zero keywords and the run goes on.

use crate::config::{AnnotateConfig, ExtractionScope};
use crate::error::KeywordifyError;
use crate::extract;
use crate::output::{AnnotateOutput, DocumentOutline, PageSummary, RunStats};
use crate::pipeline::highlight::highlight_spans;
use crate::pipeline::layout::{paginate, Page};
use crate::pipeline::ledger::KeywordLedger;
use crate::pipeline::locate::{self, first_match};
use crate::pipeline::margin::assign_notes;
use crate::pipeline::{input, segment};
use crate::render::annotated::{render_annotated, ParagraphAnnotation};
use crate::render::index::{index_page_count, render_index};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Paths of the two artifacts written by [`annotate_to_dir`], plus the full
/// in-memory result.
#[derive(Debug)]
pub struct WrittenArtifacts {
    /// `<stem>_annotated.pdf` — the annotated-content document.
    pub annotated_path: PathBuf,
    /// `<stem>_keywords.pdf` — the keyword-index document.
    pub index_path: PathBuf,
    /// The complete run result.
    pub output: AnnotateOutput,
}

/// Annotate a document file or URL.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input` — Local file path or HTTP/HTTPS URL. DOCX files are unpacked;
///   anything else is read as UTF-8 plain text.
/// * `config` — Annotation configuration
///
/// # Returns
/// `Ok(AnnotateOutput)` on success, even if extraction failed for some pages
/// (check `output.stats.failed_extractions`).
///
/// # Errors
/// Returns `Err(KeywordifyError)` only for fatal errors:
/// - File not found / permission denied / download failure
/// - File is not DOCX and not UTF-8 text
/// - No keyword source could be resolved
pub async fn annotate(
    input_str: impl AsRef<str>,
    config: &AnnotateConfig,
) -> Result<AnnotateOutput, KeywordifyError> {
    let input_str = input_str.as_ref();
    info!("Starting annotation: {}", input_str);

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let text = input::load_text(resolved.path())?;
    annotate_text(&text, config).await
}

/// Annotate raw document text that is already in memory.
pub async fn annotate_text(
    text: &str,
    config: &AnnotateConfig,
) -> Result<AnnotateOutput, KeywordifyError> {
    let total_start = Instant::now();

    // ── Step 1: Segment and paginate (pass 1) ────────────────────────────
    let layout_start = Instant::now();
    let paragraphs = segment::segment(text);
    let pages = paginate(&paragraphs, &config.geometry);
    let layout_duration_ms = layout_start.elapsed().as_millis() as u64;
    info!(
        "Pass 1: {} paragraphs over {} pages in {}ms",
        paragraphs.len(),
        pages.len(),
        layout_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(pages.len());
    }

    let mut stats = RunStats {
        paragraph_count: paragraphs.len(),
        page_count: pages.len(),
        layout_duration_ms,
        ..Default::default()
    };

    // ── Step 2: Resolve the keyword collaborator ─────────────────────────
    // An empty document skips extraction entirely, so no source (and no API
    // key) is needed to produce the two trivial artifacts.
    let source = if paragraphs.is_empty() {
        None
    } else {
        Some(extract::resolve_source(config)?)
    };

    // ── Step 3: Document-scope extraction, when configured ───────────────
    let extraction_start = Instant::now();
    let mut doc_error = None;
    let doc_candidates = match (&source, config.scope) {
        (Some(source), ExtractionScope::Document) => {
            let full_text = paragraphs.join("\n\n");
            stats.extraction_calls += 1;
            let (raw, err) = extract::extract_for_scope(source, 1, &full_text, &[], config).await;
            if err.is_some() {
                stats.failed_extractions += 1;
            }
            doc_error = err;
            // Verify once against the whole document; unmatched suggestions
            // are dropped here rather than once per page.
            let (hits, dropped) = locate::locate(&full_text, &raw);
            stats.dropped_keywords += dropped;
            Some(hits.into_iter().map(|h| h.keyword).collect::<Vec<_>>())
        }
        _ => None,
    };
    stats.extraction_duration_ms += extraction_start.elapsed().as_millis() as u64;

    // ── Step 4: Per-page pass 2 ──────────────────────────────────────────
    let mut ledger = KeywordLedger::new();
    let mut annotations = vec![ParagraphAnnotation::default(); paragraphs.len()];
    let mut summaries: Vec<PageSummary> = Vec::with_capacity(pages.len());
    let total_pages = pages.len();

    for page in &pages {
        let page_start = Instant::now();
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page.number, total_pages);
        }

        let page_texts: Vec<&str> = page.paragraphs.iter().map(|&i| paragraphs[i].as_str()).collect();
        let page_text = page_texts.join("\n\n");

        let (page_keywords, page_error) = match (&source, config.scope, &doc_candidates) {
            (_, ExtractionScope::Document, Some(candidates)) => {
                // Keywords were verified document-wide; a candidate simply
                // absent from this page is expected, not a locator miss. A
                // document-scope extraction failure is recorded on page 1.
                let err = if page.number == 1 { doc_error.clone() } else { None };
                (page_occurrences(&page_text, candidates), err)
            }
            (Some(source), ExtractionScope::PerPage, _) => {
                let exclude: Vec<String> = if config.exclude_seen {
                    ledger.entries().to_vec()
                } else {
                    Vec::new()
                };
                let extraction_start = Instant::now();
                stats.extraction_calls += 1;
                let (raw, err) =
                    extract::extract_for_scope(source, page.number, &page_text, &exclude, config)
                        .await;
                stats.extraction_duration_ms += extraction_start.elapsed().as_millis() as u64;
                if err.is_some() {
                    stats.failed_extractions += 1;
                }

                let (hits, dropped) = locate::locate(&page_text, &raw);
                stats.dropped_keywords += dropped;
                (hits.into_iter().map(|h| h.keyword).collect(), err)
            }
            _ => (Vec::new(), None),
        };

        // Highlight spans per paragraph, margin notes page-wide, ledger last.
        let notes = assign_notes(&page_texts, &page_keywords);
        for (slot, &idx) in page.paragraphs.iter().enumerate() {
            annotations[idx] = ParagraphAnnotation {
                spans: highlight_spans(&paragraphs[idx], &page_keywords),
                note: notes[slot].clone(),
            };
        }
        ledger.record(&page_keywords);

        let margin_notes: Vec<String> = notes.into_iter().flatten().collect();
        debug!(
            "Page {}: {} keywords, {} margin notes",
            page.number,
            page_keywords.len(),
            margin_notes.len()
        );

        if let Some(ref cb) = config.progress_callback {
            match &page_error {
                None => cb.on_page_complete(page.number, total_pages, page_keywords.len()),
                Some(e) => cb.on_page_error(page.number, total_pages, &e.to_string()),
            }
        }

        summaries.push(PageSummary {
            page_num: page.number,
            paragraph_count: page.paragraphs.len(),
            keywords: page_keywords,
            margin_notes,
            error: page_error,
            duration_ms: page_start.elapsed().as_millis() as u64,
        });
    }

    if let Some(ref cb) = config.progress_callback {
        let success = summaries.iter().filter(|s| s.error.is_none()).count();
        cb.on_run_complete(total_pages, success);
    }

    // ── Step 5: Draw both artifacts ──────────────────────────────────────
    let render_start = Instant::now();
    let keywords = ledger.into_keywords();
    let annotated_pdf = render_annotated(&paragraphs, &pages, &annotations, &config.geometry);
    let index_pdf = render_index(&keywords, &config.geometry);
    stats.render_duration_ms = render_start.elapsed().as_millis() as u64;

    stats.index_page_count = index_page_count(keywords.len(), &config.geometry);
    stats.keyword_count = keywords.len();
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    if stats.failed_extractions > 0 {
        warn!(
            "Annotation finished with {}/{} failed extraction scopes",
            stats.failed_extractions, stats.extraction_calls
        );
    }
    info!(
        "Annotation complete: {} keywords over {} pages, {}ms total",
        stats.keyword_count, stats.page_count, stats.total_duration_ms
    );

    Ok(AnnotateOutput {
        annotated_pdf,
        index_pdf,
        keywords,
        pages: summaries,
        stats,
    })
}

/// Annotate a document and write both artifacts into a directory.
///
/// Artifacts are named `<stem>_annotated.pdf` and `<stem>_keywords.pdf`
/// after the input filename. Uses atomic writes (temp file + rename) so a
/// crash never leaves a partial PDF behind.
pub async fn annotate_to_dir(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    config: &AnnotateConfig,
) -> Result<WrittenArtifacts, KeywordifyError> {
    let input_str = input_str.as_ref();
    let output_dir = output_dir.as_ref();

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let stem = resolved.stem();
    let text = input::load_text(resolved.path())?;
    let output = annotate_text(&text, config).await?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| KeywordifyError::OutputWriteFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    let annotated_path = output_dir.join(format!("{stem}_annotated.pdf"));
    let index_path = output_dir.join(format!("{stem}_keywords.pdf"));

    write_atomic(&annotated_path, &output.annotated_pdf).await?;
    write_atomic(&index_path, &output.index_pdf).await?;

    info!(
        "Wrote {} and {}",
        annotated_path.display(),
        index_path.display()
    );

    Ok(WrittenArtifacts {
        annotated_path,
        index_path,
        output,
    })
}

/// Synchronous wrapper around [`annotate`].
///
/// Creates a temporary tokio runtime internally.
pub fn annotate_sync(
    input_str: impl AsRef<str>,
    config: &AnnotateConfig,
) -> Result<AnnotateOutput, KeywordifyError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| KeywordifyError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(annotate(input_str, config))
}

/// Inspect a document's structure without calling the keyword collaborator.
///
/// Segmentation and pass-1 pagination only — no API key required. The page
/// assignment reported here is exactly what a full run would use.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &AnnotateConfig,
) -> Result<DocumentOutline, KeywordifyError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let text = input::load_text(resolved.path())?;

    let paragraphs = segment::segment(text.as_str());
    let pages: Vec<Page> = paginate(&paragraphs, &config.geometry);

    Ok(DocumentOutline {
        paragraph_count: paragraphs.len(),
        char_count: paragraphs.iter().map(|p| p.chars().count()).sum(),
        page_count: pages.len(),
        paragraphs_per_page: pages.iter().map(|p| p.paragraphs.len()).collect(),
    })
}

/// Document-scope helper: which verified keywords occur on this page, in
/// order of their first occurrence here.
fn page_occurrences(page_text: &str, candidates: &[String]) -> Vec<String> {
    let mut found: Vec<(usize, &String)> = candidates
        .iter()
        .filter_map(|kw| first_match(page_text, kw).map(|r| (r.start, kw)))
        .collect();
    found.sort_by_key(|(off, _)| *off);
    found.into_iter().map(|(_, kw)| kw.clone()).collect()
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), KeywordifyError> {
    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes)
        .await
        .map_err(|e| KeywordifyError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| KeywordifyError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_occurrences_orders_by_position() {
        let candidates = vec!["beta".to_string(), "alpha".to_string()];
        let occ = page_occurrences("alpha then beta", &candidates);
        assert_eq!(occ, vec!["alpha", "beta"]);
    }

    #[test]
    fn page_occurrences_skips_absent_candidates() {
        let candidates = vec!["alpha".to_string(), "xylophone".to_string()];
        let occ = page_occurrences("only alpha here", &candidates);
        assert_eq!(occ, vec!["alpha"]);
    }
}
