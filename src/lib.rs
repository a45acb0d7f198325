//! # keywordify
//!
//! Turn a document into two PDF artifacts: an annotated copy with keyword
//! highlights and margin call-outs, and a standalone 3-column keyword index.
//!
//! ## Why this crate?
//!
//! Skimming a long document means hunting for the concepts that matter. This
//! crate asks an LLM for the salient keywords of each page (or of the whole
//! document), then re-typesets the text with the first occurrence of every
//! keyword emphasised in red, a call-out for it in the left gutter next to
//! the paragraph that introduces it, and a final index of all keywords in
//! order of first appearance. The layout engine keeps page content, margin
//! notes, and the running keyword list consistent however many pages the
//! document turns out to need.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Document (DOCX / plain text / URL)
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. Extract   DOCX body → plain text (zip + quick-xml)
//!  ├─ 3. Segment   blank-line paragraph segmentation
//!  ├─ 4. Layout    pass 1: measure paragraphs, assign page breaks
//!  ├─ 5. Keywords  per page (or once per document): LLM extraction,
//!  │               verified against the actual text
//!  ├─ 6. Annotate  pass 2: highlights, margin call-outs, keyword ledger
//!  └─ 7. Render    <stem>_annotated.pdf + <stem>_keywords.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keywordify::{annotate, AnnotateConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = AnnotateConfig::default();
//!     let output = annotate("report.docx", &config).await?;
//!     std::fs::write("report_annotated.pdf", &output.annotated_pdf)?;
//!     std::fs::write("report_keywords.pdf", &output.index_pdf)?;
//!     eprintln!("{} keywords over {} pages",
//!         output.stats.keyword_count,
//!         output.stats.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `keywordify` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! keywordify = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod annotate;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use annotate::{annotate, annotate_sync, annotate_text, annotate_to_dir, inspect, WrittenArtifacts};
pub use config::{AnnotateConfig, AnnotateConfigBuilder, ExtractionScope, PageGeometry};
pub use error::{KeywordifyError, PageError};
pub use extract::{KeywordRequest, KeywordSource, SourceError};
pub use output::{AnnotateOutput, DocumentOutline, PageSummary, RunStats};
pub use progress::{AnnotateProgressCallback, NoopProgressCallback, ProgressCallback};
