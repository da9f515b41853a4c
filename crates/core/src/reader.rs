//! The reader pipeline: fetch, extract, reflow.
//!
//! [`Reader`] ties the collaborators together for one request at a time. The
//! page is fetched once; if extraction yields nothing the page is fetched a
//! second time with the fallback User-Agent and extracted again. After that
//! an empty result is accepted as-is.
//!
//! # Example
//!
//! ```no_run
//! use broadsheet_core::{Reader, ReaderConfig};
//!
//! # async fn example() -> broadsheet_core::Result<()> {
//! let config = ReaderConfig::builder().allow_domains(["example.com"]).soft_cap(400).build();
//! let reader = Reader::with_config(config);
//! let result = reader.read("https://example.com/story").await?;
//! println!("{} paragraphs", result.paragraphs.len());
//! # Ok(())
//! # }
//! ```

use tracing::{debug, info, instrument, warn};

use crate::allowlist::{DomainAllowlist, validate_url};
use crate::article::ExtractionResult;
use crate::extract::{ArticleExtractor, ContentExtractor};
use crate::fetch::{FetchConfig, fetch_url_within};
use crate::reflow::{Reflow, ReflowConfig};
use crate::Result;

/// Configuration for the reader pipeline.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// HTTP settings for both fetch attempts.
    pub fetch: FetchConfig,

    /// Paragraph reflow thresholds.
    pub reflow: ReflowConfig,

    /// Hosts the reader may fetch from (empty admits all).
    pub allowlist: DomainAllowlist,
}

impl ReaderConfig {
    /// Creates a new builder for ReaderConfig.
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::new()
    }
}

/// Builder for [`ReaderConfig`].
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl ReaderConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ReaderConfig::default() }
    }

    /// Sets the HTTP timeout in seconds.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.fetch.timeout = secs;
        self
    }

    /// Sets the User-Agent for the first attempt.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    /// Sets the User-Agent for the fallback attempt.
    pub fn fallback_user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.fallback_user_agent = value.into();
        self
    }

    /// Replaces the whole fetch configuration.
    pub fn fetch(mut self, fetch: FetchConfig) -> Self {
        self.config.fetch = fetch;
        self
    }

    /// Replaces the reflow thresholds.
    pub fn reflow(mut self, reflow: ReflowConfig) -> Self {
        self.config.reflow = reflow;
        self
    }

    /// Sets the reflow soft cap.
    pub fn soft_cap(mut self, value: usize) -> Self {
        self.config.reflow.soft_cap = value;
        self
    }

    /// Sets the reflow oversize threshold.
    pub fn oversize_threshold(mut self, value: usize) -> Self {
        self.config.reflow.oversize_threshold = value;
        self
    }

    /// Sets the allowlist.
    pub fn allowlist(mut self, allowlist: DomainAllowlist) -> Self {
        self.config.allowlist = allowlist;
        self
    }

    /// Restricts fetching to the given hosts.
    pub fn allow_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.allowlist = DomainAllowlist::new(domains);
        self
    }

    /// Builds the config.
    pub fn build(self) -> ReaderConfig {
        self.config
    }
}

impl Default for ReaderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main entry point for reading pages.
pub struct Reader<E: ContentExtractor = ArticleExtractor> {
    config: ReaderConfig,
    reflow: Reflow,
    extractor: E,
}

impl Reader<ArticleExtractor> {
    /// Creates a reader with default settings.
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    /// Creates a reader with a custom configuration.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self::with_extractor(config, ArticleExtractor::new())
    }
}

impl Default for Reader<ArticleExtractor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ContentExtractor> Reader<E> {
    /// Creates a reader around a custom content extractor.
    pub fn with_extractor(config: ReaderConfig, extractor: E) -> Self {
        let reflow = Reflow::with_config(config.reflow);
        Self { config, reflow, extractor }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Fetches a URL and returns its reflowed article text.
    ///
    /// # Errors
    ///
    /// Invalid or non-http(s) URLs, hosts outside the allowlist, and failures
    /// of the first fetch are returned as errors. A failed fallback fetch is
    /// logged and produces an empty result instead.
    #[instrument(level = "info", skip(self))]
    pub async fn read(&self, url: &str) -> Result<ExtractionResult> {
        let parsed = validate_url(url)?;
        self.config.allowlist.check(&parsed)?;

        let html = fetch_url_within(parsed.as_str(), &self.config.fetch, &self.config.allowlist).await?;
        let mut title = self.extractor.extract_metadata_title(&html);
        let mut text = self.extractor.extract(&html);

        if text.trim().is_empty() {
            warn!("extraction produced no text, refetching with fallback user agent");

            match fetch_url_within(parsed.as_str(), &self.config.fetch.fallback(), &self.config.allowlist).await {
                Ok(html) => {
                    text = self.extractor.extract(&html);
                    if title.is_none() {
                        title = self.extractor.extract_metadata_title(&html);
                    }
                }
                Err(err) => warn!(error = %err, "fallback fetch failed"),
            }
        }

        let paragraphs = self.reflow.reflow(&text);
        info!(paragraphs = paragraphs.len(), "page read");

        Ok(ExtractionResult::new(title, Some(parsed.to_string()), paragraphs))
    }

    /// Runs extraction and reflow on HTML that is already in hand.
    pub fn read_html(&self, html: &str, url: Option<&str>) -> ExtractionResult {
        let title = self.extractor.extract_metadata_title(html);
        let text = self.extractor.extract(html);
        let paragraphs = self.reflow.reflow(&text);
        debug!(paragraphs = paragraphs.len(), "html read");

        ExtractionResult::new(title, url.map(str::to_string), paragraphs)
    }
}

/// Convenience function: fetch and read a URL with default settings.
pub async fn read_url(url: &str) -> Result<ExtractionResult> {
    Reader::new().read(url).await
}

/// Convenience function: read HTML with default settings.
pub fn read_html(html: &str, url: Option<&str>) -> ExtractionResult {
    Reader::new().read_html(html, url)
}
