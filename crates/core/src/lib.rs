pub mod allowlist;
pub mod article;
#[cfg(feature = "digest")]
pub mod digest;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
#[cfg(feature = "fetch")]
pub mod reader;
pub mod reflow;
pub mod render;

pub use allowlist::{DomainAllowlist, validate_url};
pub use article::{ExtractionResult, OutputFormat};
pub use error::{BroadsheetError, Result};
pub use extract::{ArticleExtractor, ContentExtractor, ExtractConfig};
#[cfg(feature = "fetch")]
pub use fetch::FetchConfig;
#[cfg(feature = "fetch")]
pub use fetch::{MAX_REDIRECTS, fetch_bytes, fetch_file, fetch_stdin, fetch_url, fetch_url_within};
#[cfg(feature = "fetch")]
pub use reader::{Reader, ReaderConfig, ReaderConfigBuilder, read_html, read_url};
pub use reflow::{
    DEFAULT_OVERSIZE_THRESHOLD, DEFAULT_SOFT_CAP, PARAGRAPH_BREAK, Reflow, ReflowConfig, ReflowConfigBuilder,
    normalize_text, rechunk_paragraph, reflow, reflow_optional, split_paragraphs, split_sentences,
};
pub use render::{EMPTY_ARTICLE_MESSAGE, display_title, escape_html, render_reader_page, render_text};
