//! Output types: finished artifacts, per-page summaries, and run statistics.

use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// The complete result of an annotation run.
///
/// Both PDF artifacts are returned as in-memory byte buffers; use
/// [`crate::annotate::annotate_to_dir`] to write them to disk with the
/// conventional `<stem>_annotated.pdf` / `<stem>_keywords.pdf` names.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotateOutput {
    /// The annotated-content PDF (highlights + margin call-outs).
    #[serde(skip)]
    pub annotated_pdf: Vec<u8>,

    /// The keyword-index PDF (3-column, order of first appearance).
    #[serde(skip)]
    pub index_pdf: Vec<u8>,

    /// Finalized ledger: every keyword in order of first appearance across
    /// the whole document, exact-string deduplicated.
    pub keywords: Vec<String>,

    /// Per-page summaries in page order.
    pub pages: Vec<PageSummary>,

    /// Aggregate statistics for the run.
    pub stats: RunStats,
}

/// What happened on one page during pass 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-indexed page number.
    pub page_num: usize,

    /// Number of paragraphs pass 1 assigned to this page.
    pub paragraph_count: usize,

    /// Keywords located on this page, in order of first occurrence.
    ///
    /// These are the *verified* keywords: collaborator suggestions that never
    /// matched the page text are dropped before this list is built.
    pub keywords: Vec<String>,

    /// Keywords that received a margin call-out on this page.
    pub margin_notes: Vec<String>,

    /// Non-fatal extraction error for this page's scope, if any.
    pub error: Option<PageError>,

    /// Wall-clock time spent on this page (extraction + annotation), ms.
    pub duration_ms: u64,
}

/// Aggregate statistics for an annotation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Paragraph units produced by the segmenter.
    pub paragraph_count: usize,
    /// Pages produced by pass 1.
    pub page_count: usize,
    /// Pages of the keyword-index artifact.
    pub index_page_count: usize,
    /// Distinct keywords in the final ledger.
    pub keyword_count: usize,
    /// Extraction calls issued (1 in document scope, one per page otherwise).
    pub extraction_calls: usize,
    /// Extraction calls that failed after all retries.
    pub failed_extractions: usize,
    /// Collaborator suggestions dropped because they never matched their scope.
    pub dropped_keywords: usize,
    /// Time spent in segmentation + pass-1 layout, ms.
    pub layout_duration_ms: u64,
    /// Time spent waiting on the keyword collaborator, ms.
    pub extraction_duration_ms: u64,
    /// Time spent in pass-2 placement and PDF generation, ms.
    pub render_duration_ms: u64,
    /// End-to-end wall-clock time, ms.
    pub total_duration_ms: u64,
}

/// Structural outline of a document, produced without any collaborator call.
///
/// Returned by [`crate::annotate::inspect`]; pagination here is exactly the
/// pass-1 result the full run would use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutline {
    /// Paragraph units after segmentation.
    pub paragraph_count: usize,
    /// Total characters of paragraph text.
    pub char_count: usize,
    /// Pages pass 1 assigns under the configured geometry.
    pub page_count: usize,
    /// Paragraphs per page, in page order.
    pub paragraphs_per_page: Vec<usize>,
}
