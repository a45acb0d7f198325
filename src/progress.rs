//! Progress-callback trait for per-page annotation events.
//!
//! Inject an [`Arc<dyn AnnotateProgressCallback>`] via
//! [`crate::config::AnnotateConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through each page.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a log, or a terminal progress bar without the
//! library knowing anything about how the host application communicates. The
//! pipeline itself is strictly sequential, but the trait is `Send + Sync` so
//! the same callback can be shared with other tasks in the host process.

use std::sync::Arc;

/// Called by the annotation pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are processed strictly in order, so events
/// for page N always arrive before events for page N+1.
pub trait AnnotateProgressCallback: Send + Sync {
    /// Called once after pass-1 layout, before any keyword extraction.
    ///
    /// # Arguments
    /// * `total_pages` — pages pass 1 produced for the document
    fn on_run_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page's scope is sent to the keyword collaborator.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been fully annotated.
    ///
    /// # Arguments
    /// * `keyword_count` — keywords located (and therefore highlighted) on the page
    fn on_page_complete(&self, page_num: usize, total_pages: usize, keyword_count: usize) {
        let _ = (page_num, total_pages, keyword_count);
    }

    /// Called when extraction for a page failed after all retries.
    ///
    /// The page is still rendered (with zero keywords); this event reports
    /// the degradation, not an abort.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the last page, before the index artifact is built.
    ///
    /// # Arguments
    /// * `success_count` — pages annotated without an extraction error
    fn on_run_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnnotateProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnnotateConfig`].
pub type ProgressCallback = Arc<dyn AnnotateProgressCallback>;
