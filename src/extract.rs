//! Keyword extraction: the external collaborator seam and its LLM driver.
//!
//! The pipeline never talks to an LLM directly — it talks to a
//! [`KeywordSource`], an object-safe trait describing the collaborator
//! contract: given a text span and `(min, max)` bounds (plus an optional
//! exclude list), return an ordered list of keyword strings. The production
//! implementation [`LlmKeywordSource`] drives an `edgequake-llm` chat
//! completion; tests inject static or failing sources through the same seam.
//!
//! Two consequences of the contract worth restating:
//!
//! * The source may return **fewer** than `min` keywords — a thin page
//!   simply has less to say. That is a diagnostic, not an error.
//! * Returned strings are **not guaranteed to be verbatim substrings** of
//!   the input. Every suggestion must pass through the keyword locator
//!   before it is trusted.
//!
//! ## Retry strategy
//!
//! HTTP 429/503 errors from LLM APIs are transient and frequent. Exponential
//! backoff (`retry_backoff_ms * 2^(attempt-1)`) keeps the wait short: with a
//! 500 ms base and 2 retries the sequence is 500 ms → 1 s. After the budget
//! is spent the scope degrades to an empty keyword set and the run goes on.

use crate::config::AnnotateConfig;
use crate::error::{KeywordifyError, PageError};
use crate::prompts::{extraction_prompt, SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// One extraction request: a text scope plus the collaborator bounds.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRequest<'a> {
    /// The text span to extract keywords from (whole document or one page).
    pub text: &'a str,
    /// Minimum keywords the caller would like back.
    pub min_keywords: usize,
    /// Hard cap on the number of keywords returned.
    pub max_keywords: usize,
    /// Keywords the source should avoid repeating; may be empty.
    pub exclude: &'a [String],
}

/// Error from a [`KeywordSource`] implementation.
///
/// Deliberately opaque: the pipeline only needs a human-readable reason for
/// the diagnostic, and retry-worthiness is decided by the retry budget, not
/// by error classification.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

/// The external keyword-extraction collaborator.
///
/// Implementations must be `Send + Sync`. Calls are issued strictly
/// sequentially, one scope at a time.
pub trait KeywordSource: Send + Sync {
    /// Extract an ordered keyword list for one scope.
    ///
    /// Must return at most `req.max_keywords` entries; may return fewer than
    /// `req.min_keywords`.
    fn extract<'a>(&'a self, req: KeywordRequest<'a>) -> BoxFuture<'a, Result<Vec<String>, SourceError>>;
}

/// [`KeywordSource`] backed by an `edgequake-llm` chat provider.
pub struct LlmKeywordSource {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_response_tokens: usize,
}

impl LlmKeywordSource {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32, max_response_tokens: usize) -> Self {
        Self {
            provider,
            temperature,
            max_response_tokens,
        }
    }
}

impl KeywordSource for LlmKeywordSource {
    fn extract<'a>(&'a self, req: KeywordRequest<'a>) -> BoxFuture<'a, Result<Vec<String>, SourceError>> {
        Box::pin(async move {
            let messages = vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(extraction_prompt(
                    req.text,
                    req.min_keywords,
                    req.max_keywords,
                    req.exclude,
                )),
            ];
            let options = CompletionOptions {
                temperature: Some(self.temperature),
                max_tokens: Some(self.max_response_tokens),
                ..Default::default()
            };

            let response = self
                .provider
                .chat(&messages, Some(&options))
                .await
                .map_err(|e| SourceError(e.to_string()))?;

            debug!(
                "Extraction call: {} input tokens, {} output tokens",
                response.prompt_tokens, response.completion_tokens
            );

            Ok(parse_keywords(&response.content, req.max_keywords))
        })
    }
}

/// Parse a comma-separated keyword response into an ordered list.
///
/// Trims whitespace and stray bullet/quote characters, drops empties, and
/// truncates to `max_keywords`. Order is preserved — the collaborator returns
/// keywords in the order they should appear, and the locator re-sorts by
/// actual position later anyway.
pub fn parse_keywords(response: &str, max_keywords: usize) -> Vec<String> {
    response
        .split(',')
        .map(|kw| kw.trim().trim_matches(['"', '\'', '-', '*', '.']).trim())
        .filter(|kw| !kw.is_empty())
        .take(max_keywords)
        .map(|kw| kw.to_string())
        .collect()
}

/// Resolve the keyword source, from most-specific to least-specific.
///
/// The fallback chain lets library users and CLI users each set exactly as
/// much as they need:
///
/// 1. **Pre-built source** (`config.source`) — the caller constructed the
///    collaborator entirely; used as-is. This is also the test seam.
///
/// 2. **Named provider + model** (`config.provider_name`) — reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment
///    via [`ProviderFactory::create_llm_provider`].
///
/// 3. **Environment pair** (`KEYWORDIFY_LLM_PROVIDER` + `KEYWORDIFY_MODEL`)
///    — a provider and model chosen at the execution-environment level
///    (Makefile, shell script, CI).
///
/// 4. **OpenAI key shortcut** — `OPENAI_API_KEY` set means OpenAI with the
///    configured (or default) model, even when other provider keys exist.
///
/// 5. **Full auto-detection** (`ProviderFactory::from_env`) — scans all known
///    API key variables and picks the first available provider.
pub fn resolve_source(config: &AnnotateConfig) -> Result<Arc<dyn KeywordSource>, KeywordifyError> {
    if let Some(ref source) = config.source {
        return Ok(Arc::clone(source));
    }

    let wrap = |provider: Arc<dyn LLMProvider>| -> Arc<dyn KeywordSource> {
        Arc::new(LlmKeywordSource::new(
            provider,
            config.temperature,
            config.max_response_tokens,
        ))
    };

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4o-mini");
        return create_llm_source(name, model).map(wrap);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("KEYWORDIFY_LLM_PROVIDER"),
        std::env::var("KEYWORDIFY_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_llm_source(&prov, &model).map(wrap);
        }
    }

    // Prefer OpenAI explicitly when an OpenAI API key is present, so users
    // with multiple provider keys get a stable default.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or("gpt-4o-mini");
            return create_llm_source("openai", model).map(wrap);
        }
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| KeywordifyError::SourceNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(wrap(provider))
}

/// Instantiate a named provider with the given model.
fn create_llm_source(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, KeywordifyError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        KeywordifyError::SourceNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Call the source for one scope, retrying transient failures.
///
/// Returns the keyword list and, when every attempt failed, the [`PageError`]
/// describing the degradation. The caller always proceeds: an error here
/// means "this scope gets zero keywords", never "abort the run".
pub async fn extract_for_scope(
    source: &Arc<dyn KeywordSource>,
    page_num: usize,
    text: &str,
    exclude: &[String],
    config: &AnnotateConfig,
) -> (Vec<String>, Option<PageError>) {
    let req = KeywordRequest {
        text,
        min_keywords: config.min_keywords,
        max_keywords: config.max_keywords,
        exclude,
    };

    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config
                .retry_backoff_ms
                .saturating_mul(2u64.saturating_pow(attempt - 1));
            warn!(
                "Page {}: extraction retry {}/{} after {}ms",
                page_num, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match source.extract(req).await {
            Ok(keywords) => {
                if keywords.len() < config.min_keywords {
                    warn!(
                        "Page {}: collaborator returned {} keywords (requested at least {})",
                        page_num,
                        keywords.len(),
                        config.min_keywords
                    );
                }
                return (keywords, None);
            }
            Err(e) => {
                warn!("Page {}: extraction attempt {} failed — {}", page_num, attempt + 1, e);
                last_err = Some(e.to_string());
            }
        }
    }

    let detail = last_err.unwrap_or_else(|| "Unknown error".to_string());
    (
        Vec::new(),
        Some(PageError::ExtractionFailed {
            page: page_num,
            retries: config.max_retries,
            detail,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that always returns the same list. Shared with integration tests
    /// via `config.source`.
    struct StaticSource(Vec<String>);

    impl KeywordSource for StaticSource {
        fn extract<'a>(
            &'a self,
            req: KeywordRequest<'a>,
        ) -> BoxFuture<'a, Result<Vec<String>, SourceError>> {
            let out: Vec<String> = self.0.iter().take(req.max_keywords).cloned().collect();
            Box::pin(async move { Ok(out) })
        }
    }

    struct FailingSource;

    impl KeywordSource for FailingSource {
        fn extract<'a>(
            &'a self,
            _req: KeywordRequest<'a>,
        ) -> BoxFuture<'a, Result<Vec<String>, SourceError>> {
            Box::pin(async move { Err(SourceError("HTTP 503".into())) })
        }
    }

    #[test]
    fn parse_plain_list() {
        let kws = parse_keywords("alpha, beta, gamma", 5);
        assert_eq!(kws, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn parse_caps_at_max() {
        let kws = parse_keywords("a, b, c, d, e, f, g", 5);
        assert_eq!(kws.len(), 5);
    }

    #[test]
    fn parse_strips_decoration_and_empties() {
        let kws = parse_keywords("\"neural networks\", , - gradient descent, ", 5);
        assert_eq!(kws, vec!["neural networks", "gradient descent"]);
    }

    #[test]
    fn parse_empty_response() {
        assert!(parse_keywords("", 5).is_empty());
        assert!(parse_keywords(", , ,", 5).is_empty());
    }

    #[tokio::test]
    async fn static_source_respects_max() {
        let src: Arc<dyn KeywordSource> = Arc::new(StaticSource(vec![
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into(),
        ]));
        let config = AnnotateConfig {
            max_keywords: 2,
            ..Default::default()
        };
        let (kws, err) = extract_for_scope(&src, 1, "text", &[], &config).await;
        assert_eq!(kws, vec!["a", "b"]);
        assert!(err.is_none());
    }

    #[tokio::test]
    async fn failing_source_degrades_to_empty() {
        let src: Arc<dyn KeywordSource> = Arc::new(FailingSource);
        let config = AnnotateConfig {
            max_retries: 1,
            retry_backoff_ms: 1,
            ..Default::default()
        };
        let (kws, err) = extract_for_scope(&src, 3, "text", &[], &config).await;
        assert!(kws.is_empty());
        match err {
            Some(PageError::ExtractionFailed { page, retries, detail }) => {
                assert_eq!(page, 3);
                assert_eq!(retries, 1);
                assert!(detail.contains("503"));
            }
            other => panic!("expected ExtractionFailed, got {other:?}"),
        }
    }
}
