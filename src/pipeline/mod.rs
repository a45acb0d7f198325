//! Pipeline stages for document annotation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different keyword collaborator) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ docx ──▶ segment ──▶ layout ──▶ locate ──▶ highlight / margin / ledger
//! (URL/path) (unzip)  (paragraphs) (pass 1)  (verify)   (per-page pass 2 inputs)
//! ```
//!
//! 1. [`input`]     — canonicalise the user-supplied path or URL to a local file
//! 2. [`docx`]      — unzip `word/document.xml` and flatten it to plain text
//! 3. [`segment`]   — blank-line paragraph segmentation
//! 4. [`layout`]    — pass 1: measure paragraphs, assign them to pages
//! 5. [`locate`]    — verify collaborator keywords against the scope text;
//!    the only stage that touches network I/O is the extraction seam in
//!    [`crate::extract`], driven between passes
//! 6. [`highlight`] / [`margin`] / [`ledger`] — per-page annotation decisions
//!    consumed by pass 2 ([`crate::render`])

pub mod docx;
pub mod highlight;
pub mod input;
pub mod layout;
pub mod ledger;
pub mod locate;
pub mod margin;
pub mod segment;
