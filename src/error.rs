//! Error types for the keywordify library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`KeywordifyError`] — **Fatal**: the run cannot proceed at all
//!   (missing input file, unreadable DOCX, no keyword source configured).
//!   Returned as `Err(KeywordifyError)` from the top-level `annotate*`
//!   functions, always before any layout work begins.
//!
//! * [`PageError`] — **Non-fatal**: keyword extraction failed for one scope
//!   (a transient API error, a malformed response). Stored inside
//!   [`crate::output::PageSummary`] so callers can inspect partial success;
//!   the affected page simply renders with zero keywords.
//!
//! Once the input text has been segmented, nothing in the core raises an
//! unrecoverable error: locator misses and geometry overflow are diagnostics
//! only, and the run always produces both output artifacts.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the keywordify library.
///
/// Scope-level extraction failures use [`PageError`] and are stored in
/// [`crate::output::PageSummary`] rather than propagated here.
#[derive(Debug, Error)]
pub enum KeywordifyError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input exists but cannot be interpreted as a supported document.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Document errors ───────────────────────────────────────────────────
    /// The file has a `.docx` extension but is not an OOXML zip container.
    #[error("File is not a valid DOCX: '{path}'\nFirst bytes: {magic:?}")]
    NotADocx { path: PathBuf, magic: [u8; 4] },

    /// The DOCX container opened but `word/document.xml` could not be parsed.
    #[error("Failed to parse DOCX: {0}")]
    DocxParseFailed(String),

    // ── Keyword-source errors ─────────────────────────────────────────────
    /// The configured keyword source is not initialised (missing API key etc.).
    #[error("Keyword provider '{provider}' is not configured.\n{hint}")]
    SourceNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single extraction scope.
///
/// Stored in [`crate::output::PageSummary`] when keyword extraction fails for
/// a page (or, in whole-document mode, for the document scope, recorded on
/// page 1). The run continues with an empty keyword set for that scope.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The keyword collaborator failed after all retries.
    #[error("Page {page}: keyword extraction failed after {retries} retries: {detail}")]
    ExtractionFailed {
        page: usize,
        retries: u32,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = KeywordifyError::FileNotFound {
            path: PathBuf::from("/tmp/missing.docx"),
        };
        assert!(e.to_string().contains("/tmp/missing.docx"));
    }

    #[test]
    fn not_a_docx_display() {
        let e = KeywordifyError::NotADocx {
            path: PathBuf::from("report.docx"),
            magic: *b"%PDF",
        };
        let msg = e.to_string();
        assert!(msg.contains("report.docx"), "got: {msg}");
    }

    #[test]
    fn extraction_failed_display() {
        let e = PageError::ExtractionFailed {
            page: 3,
            retries: 2,
            detail: "HTTP 429".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 3"));
        assert!(msg.contains("2 retries"));
        assert!(msg.contains("HTTP 429"));
    }

    #[test]
    fn source_not_configured_display() {
        let e = KeywordifyError::SourceNotConfigured {
            provider: "openai".into(),
            hint: "set OPENAI_API_KEY".into(),
        };
        assert!(e.to_string().contains("openai"));
        assert!(e.to_string().contains("OPENAI_API_KEY"));
        // The provider name is display data, not an error cause.
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn extraction_failed_keeps_large_retry_budgets() {
        let e = PageError::ExtractionFailed {
            page: 1,
            retries: 300,
            detail: "timeout".into(),
        };
        assert!(e.to_string().contains("300 retries"));
    }
}
