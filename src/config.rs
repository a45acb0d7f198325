//! Configuration types for the annotation run.
//!
//! All behaviour is controlled through [`AnnotateConfig`], built via its
//! [`AnnotateConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs, serialise the interesting parts for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! Page geometry lives in its own [`PageGeometry`] struct because the layout
//! engine and both renderers consume it read-only; it never changes during a
//! run.

use crate::error::KeywordifyError;
use crate::extract::KeywordSource;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One typographic inch in PDF points.
const INCH: f32 = 72.0;

/// Fixed page geometry for both output artifacts.
///
/// All values are in PDF points (1/72 inch) on a US-letter page. The defaults
/// reproduce the layout the annotated artifact was designed around: a 1.5 in
/// left gutter reserved for margin call-outs, 0.75 in outer margins, and an
/// 11 pt body face on 14 pt leading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width in points. Default: 612 (letter).
    pub page_width: f32,
    /// Page height in points. Default: 792 (letter).
    pub page_height: f32,
    /// Outer margin on all four sides. Default: 54 (0.75 in).
    pub margin: f32,
    /// Width of the left gutter reserved for margin annotations. Default: 108 (1.5 in).
    pub gutter_width: f32,
    /// Gap between the gutter and the content column. Default: 18 (0.25 in).
    pub gutter_gap: f32,
    /// Body font size. Default: 11.
    pub body_size: f32,
    /// Body line leading. Default: 14.
    pub body_leading: f32,
    /// Margin-annotation font size. Default: 9.
    pub note_size: f32,
    /// Vertical gap between paragraphs. Default: 10.8 (0.15 in).
    pub para_gap: f32,
    /// Line height in the keyword-index artifact. Default: 18 (0.25 in).
    pub index_line_height: f32,
    /// Horizontal gap between index columns. Default: 36 (0.5 in).
    pub index_column_gap: f32,
    /// Rows per index column before spilling to the next. Default: 30.
    pub index_rows_per_column: usize,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 8.5 * INCH,
            page_height: 11.0 * INCH,
            margin: 0.75 * INCH,
            gutter_width: 1.5 * INCH,
            gutter_gap: 0.25 * INCH,
            body_size: 11.0,
            body_leading: 14.0,
            note_size: 9.0,
            para_gap: 0.15 * INCH,
            index_line_height: 0.25 * INCH,
            index_column_gap: 0.5 * INCH,
            index_rows_per_column: 30,
        }
    }
}

impl PageGeometry {
    /// X position where body text starts (right of the annotation gutter).
    pub fn content_x(&self) -> f32 {
        self.margin + self.gutter_width + self.gutter_gap
    }

    /// Usable width of the body text column.
    pub fn content_width(&self) -> f32 {
        self.page_width - self.content_x() - self.margin
    }

    /// Y position of the first baseline area on a fresh page (top content edge).
    pub fn content_top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Y position below which no paragraph may start (bottom content edge).
    pub fn content_bottom(&self) -> f32 {
        self.margin
    }

    /// Width of one index column.
    pub fn index_column_width(&self) -> f32 {
        (self.page_width - 2.0 * self.margin - 2.0 * self.index_column_gap) / 3.0
    }
}

/// The span of text over which keyword extraction and matching operate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtractionScope {
    /// One extraction call over the whole document; every page is annotated
    /// from that single keyword list. Cheapest, and the mode the keyword
    /// index was originally designed around. (default)
    #[default]
    Document,
    /// One extraction call per page. Each page's keyword set is independent,
    /// so a keyword may earn a fresh margin call-out on a later page.
    PerPage,
}

/// Configuration for an annotation run.
///
/// Built via [`AnnotateConfig::builder()`] or using
/// [`AnnotateConfig::default()`].
///
/// # Example
/// ```rust
/// use keywordify::{AnnotateConfig, ExtractionScope};
///
/// let config = AnnotateConfig::builder()
///     .scope(ExtractionScope::PerPage)
///     .min_keywords(3)
///     .max_keywords(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnnotateConfig {
    /// Extraction scope: whole document or per page. Default: [`ExtractionScope::Document`].
    pub scope: ExtractionScope,

    /// Minimum keywords requested from the collaborator. Default: 3.
    ///
    /// The collaborator may legitimately return fewer when the source
    /// material does not support it; that is a diagnostic, not an error.
    pub min_keywords: usize,

    /// Maximum keywords accepted per extraction call. Default: 5.
    ///
    /// Responses longer than this are truncated. Five keywords per scope
    /// keeps the margin gutter readable; past that, call-outs start
    /// competing for vertical space with the paragraphs they annotate.
    pub max_keywords: usize,

    /// Per-page mode only: pass already-ledgered keywords to the collaborator
    /// as an exclude list. Default: false.
    ///
    /// Off by default so that a keyword reappearing on a later page may be
    /// extracted (and margin-annotated) again — each page's keyword set is
    /// independent by design. Turn on to force novel keywords on every page.
    pub exclude_seen: bool,

    /// LLM model identifier, e.g. "gpt-4o-mini". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `source`, uses `ProviderFactory::from_env()`.
    pub provider_name: Option<String>,

    /// Pre-constructed keyword source. Takes precedence over `provider_name`.
    ///
    /// This is the test seam: inject a static or failing source here and no
    /// network call is ever made.
    pub source: Option<Arc<dyn KeywordSource>>,

    /// Sampling temperature for the extraction completion. Default: 0.3.
    ///
    /// Low temperature keeps the keyword list stable between runs on the
    /// same document; higher values trade determinism for variety.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per extraction call. Default: 200.
    ///
    /// A comma-separated list of five keywords fits comfortably; anything
    /// longer is the model rambling.
    pub max_response_tokens: usize,

    /// Maximum retry attempts on a transient extraction failure. Default: 2.
    ///
    /// Permanent errors (bad API key) are not worth retrying, but most 5xx
    /// and timeout errors clear within a second or two. After the budget is
    /// spent the scope degrades to an empty keyword set.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    pub retry_backoff_ms: u64,

    /// Page geometry for both artifacts. Default: [`PageGeometry::default`].
    pub geometry: PageGeometry,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Progress callback for per-page events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            scope: ExtractionScope::default(),
            min_keywords: 3,
            max_keywords: 5,
            exclude_seen: false,
            model: None,
            provider_name: None,
            source: None,
            temperature: 0.3,
            max_response_tokens: 200,
            max_retries: 2,
            retry_backoff_ms: 500,
            geometry: PageGeometry::default(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnnotateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotateConfig")
            .field("scope", &self.scope)
            .field("min_keywords", &self.min_keywords)
            .field("max_keywords", &self.max_keywords)
            .field("exclude_seen", &self.exclude_seen)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("source", &self.source.as_ref().map(|_| "<dyn KeywordSource>"))
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("geometry", &self.geometry)
            .finish()
    }
}

impl AnnotateConfig {
    /// Create a new builder for `AnnotateConfig`.
    pub fn builder() -> AnnotateConfigBuilder {
        AnnotateConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnnotateConfig`].
#[derive(Debug)]
pub struct AnnotateConfigBuilder {
    config: AnnotateConfig,
}

impl AnnotateConfigBuilder {
    pub fn scope(mut self, scope: ExtractionScope) -> Self {
        self.config.scope = scope;
        self
    }

    pub fn min_keywords(mut self, n: usize) -> Self {
        self.config.min_keywords = n.max(1);
        self
    }

    pub fn max_keywords(mut self, n: usize) -> Self {
        self.config.max_keywords = n.max(1);
        self
    }

    pub fn exclude_seen(mut self, v: bool) -> Self {
        self.config.exclude_seen = v;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn source(mut self, source: Arc<dyn KeywordSource>) -> Self {
        self.config.source = Some(source);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_response_tokens(mut self, n: usize) -> Self {
        self.config.max_response_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnnotateConfig, KeywordifyError> {
        let c = &self.config;
        if c.min_keywords > c.max_keywords {
            return Err(KeywordifyError::InvalidConfig(format!(
                "min_keywords ({}) must be <= max_keywords ({})",
                c.min_keywords, c.max_keywords
            )));
        }
        let g = &c.geometry;
        if g.content_width() <= 0.0 {
            return Err(KeywordifyError::InvalidConfig(format!(
                "geometry leaves no content width: page {} pt, gutter {} pt",
                g.page_width, g.gutter_width
            )));
        }
        if g.index_column_width() <= 0.0 {
            return Err(KeywordifyError::InvalidConfig(
                "geometry leaves no index column width".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_derived_values() {
        let g = PageGeometry::default();
        assert_eq!(g.content_x(), 180.0);
        assert_eq!(g.content_width(), 378.0);
        assert_eq!(g.content_top(), 738.0);
        assert_eq!(g.index_column_width(), 144.0);
    }

    #[test]
    fn builder_rejects_inverted_keyword_bounds() {
        let err = AnnotateConfig::builder()
            .min_keywords(6)
            .max_keywords(3)
            .build();
        assert!(matches!(err, Err(KeywordifyError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_zero_content_width() {
        let mut g = PageGeometry::default();
        g.gutter_width = 600.0;
        let err = AnnotateConfig::builder().geometry(g).build();
        assert!(matches!(err, Err(KeywordifyError::InvalidConfig(_))));
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = AnnotateConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }
}
