//! Main-content extraction from raw HTML.
//!
//! The extractor turns a fetched page into best-effort plain article text:
//! one block of text per paragraph-level element, separated by blank lines,
//! ready for [`crate::reflow`]. The content root is picked by selector; the
//! DOM is not scored.
//!
//! # Example
//!
//! ```rust
//! use broadsheet_core::{ArticleExtractor, ContentExtractor};
//!
//! let html = r#"<html><head><title>Story</title></head>
//!     <body><nav><a href="/">Home</a></nav>
//!     <article><p>First paragraph.</p><p>Second paragraph.</p></article></body></html>"#;
//!
//! let extractor = ArticleExtractor::new();
//! assert_eq!(extractor.extract(html), "First paragraph.\n\nSecond paragraph.");
//! assert_eq!(extractor.extract_metadata_title(html), Some("Story".to_string()));
//! ```

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::reflow::PARAGRAPH_BREAK;

const BLOCK_TAGS: [&str; 10] = ["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre"];

const STRIP_TAGS: [&str; 20] = [
    "script", "style", "noscript", "iframe", "svg", "canvas", "img", "picture", "video", "audio", "figure", "table",
    "form", "nav", "header", "footer", "aside", "button", "object", "embed",
];

const CONTENT_SELECTORS: [&str; 7] = [
    "article",
    "main",
    "[role=\"main\"]",
    "#content",
    ".post-content",
    ".entry-content",
    ".article-body",
];

static BOILERPLATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(advert|banner|breadcrumbs?|comment|cookie|disqus|newsletter|popup|promo|related|share|sharing|sidebar|social|sponsor|subscribe)")
        .expect("boilerplate pattern")
});

static POSITIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|main|page|post|text|blog|story)").expect("positive pattern")
});

/// Source of plain article text and a title for a page.
///
/// Both methods may legitimately return nothing; callers treat an empty
/// result as a normal outcome.
pub trait ContentExtractor: Send + Sync {
    /// Extracts plain article text, paragraphs separated by blank lines.
    fn extract(&self, html: &str) -> String;

    /// Extracts the page title from document metadata.
    fn extract_metadata_title(&self, html: &str) -> Option<String>;
}

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Elements removed, with their content, before extraction
    pub strip_tags: Vec<String>,
    /// Candidate content roots, tried in order
    pub content_selectors: Vec<String>,
    /// Minimum characters of text a candidate root must hold
    pub min_root_chars: usize,
    /// Blocks shorter than this are dropped
    pub min_block_chars: usize,
    /// Whether to drop elements whose class or id looks like boilerplate
    pub remove_boilerplate: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            strip_tags: STRIP_TAGS.iter().map(|t| t.to_string()).collect(),
            content_selectors: CONTENT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            min_root_chars: 140,
            min_block_chars: 1,
            remove_boilerplate: true,
        }
    }
}

/// Selector-based article extractor.
#[derive(Debug, Clone, Default)]
pub struct ArticleExtractor {
    config: ExtractConfig,
}

impl ArticleExtractor {
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }
}

impl ContentExtractor for ArticleExtractor {
    fn extract(&self, html: &str) -> String {
        if html.trim().is_empty() {
            return String::new();
        }

        let cleaned = strip_elements(html, &self.config);
        let document = Html::parse_document(&cleaned);

        let Some(root) = find_content_root(&document, &self.config) else {
            return String::new();
        };

        let blocks = collect_blocks(root, self.config.min_block_chars);
        debug!(root = root.value().name(), blocks = blocks.len(), "extracted content blocks");

        if blocks.is_empty() { root.text().collect::<String>() } else { blocks.join(PARAGRAPH_BREAK) }
    }

    /// Title with priority fallback:
    /// 1. Open Graph `og:title`
    /// 2. Twitter `twitter:title`
    /// 3. Meta `title`
    /// 4. `<title>` element
    /// 5. First `<h1>` element
    fn extract_metadata_title(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        meta_content(&document, r#"meta[property="og:title"]"#)
            .or_else(|| meta_content(&document, r#"meta[name="twitter:title"]"#))
            .or_else(|| meta_content(&document, r#"meta[name="title"]"#))
            .or_else(|| first_text(&document, "title"))
            .or_else(|| first_text(&document, "h1"))
    }
}

/// Remove non-text and boilerplate elements before parsing
fn strip_elements(html: &str, config: &ExtractConfig) -> String {
    let mut handlers: Vec<_> = config
        .strip_tags
        .iter()
        .filter(|tag| match tag.parse::<lol_html::Selector>() {
            Ok(_) => true,
            Err(err) => {
                debug!(selector = %tag, error = %err, "skipping invalid strip selector");
                false
            }
        })
        .map(|tag| {
            lol_html::element!(tag.as_str(), |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    if config.remove_boilerplate {
        handlers.push(lol_html::element!("*", |el| {
            let tag = el.tag_name();
            if tag == "html" || tag == "body" {
                return Ok(());
            }

            let hints = [el.get_attribute("id"), el.get_attribute("class")];
            for hint in hints.iter().flatten() {
                if hint
                    .split_whitespace()
                    .any(|name| BOILERPLATE_PATTERN.is_match(name) && !POSITIVE_PATTERN.is_match(name))
                {
                    el.remove();
                    return Ok(());
                }
            }

            Ok(())
        }));
    }

    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    if rewriter.end().is_err() {
        return html.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| html.to_string())
}

fn find_content_root<'a>(document: &'a Html, config: &ExtractConfig) -> Option<ElementRef<'a>> {
    for candidate in &config.content_selectors {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };

        if let Some(root) = document.select(&selector).find(|el| text_len(*el) >= config.min_root_chars) {
            return Some(root);
        }
    }

    let body = Selector::parse("body").ok()?;
    document.select(&body).next().or_else(|| Some(document.root_element()))
}

fn collect_blocks(root: ElementRef<'_>, min_block_chars: usize) -> Vec<String> {
    let Ok(selector) = Selector::parse(&BLOCK_TAGS.join(", ")) else {
        return Vec::new();
    };

    root.select(&selector)
        .filter(|el| !has_block_ancestor(*el, root))
        .map(|el| el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty() && text.chars().count() >= min_block_chars)
        .collect()
}

/// Whether a block sits inside another block below `root`
fn has_block_ancestor(element: ElementRef<'_>, root: ElementRef<'_>) -> bool {
    for ancestor in element.ancestors() {
        if ancestor.id() == root.id() {
            return false;
        }

        if let Some(parent) = ElementRef::wrap(ancestor)
            && BLOCK_TAGS.contains(&parent.value().name())
        {
            return true;
        }
    }

    false
}

fn text_len(element: ElementRef<'_>) -> usize {
    element.text().map(|t| t.trim().chars().count()).sum()
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(clean_title)
        .find(|title| !title.is_empty())
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let title = clean_title(&element.text().collect::<String>());
    if title.is_empty() { None } else { Some(title) }
}

fn clean_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r##"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <title>Page Title</title>
            <meta property="og:title" content="  Open   Graph Title ">
            <script>var tracking = "This is not content.";</script>
        </head>
        <body>
            <header><h1>Site Name</h1></header>
            <nav><a href="/">Home</a> <a href="/world">World</a></nav>
            <article>
                <h1>The Headline</h1>
                <p>This is the first paragraph of the story, long enough to look like real content.</p>
                <div class="share-buttons"><p>Share this on social media</p></div>
                <figure><img src="a.jpg"><figcaption>A caption.</figcaption></figure>
                <p>A second   paragraph
                   spans several source lines.</p>
                <blockquote><p>A quoted remark.</p></blockquote>
                <ul><li>One item
                    <ul><li>Nested item</li></ul></li></ul>
            </article>
            <footer><p>Copyright notice</p></footer>
        </body>
        </html>
    "##;

    #[test]
    fn test_extract_config_default() {
        let config = ExtractConfig::default();
        assert_eq!(config.min_root_chars, 140);
        assert!(config.strip_tags.contains(&"script".to_string()));
        assert_eq!(config.content_selectors.first().map(String::as_str), Some("article"));
        assert!(config.remove_boilerplate);
    }

    #[test]
    fn test_extract_article_blocks() {
        let text = ArticleExtractor::new().extract(ARTICLE_HTML);
        let blocks: Vec<&str> = text.split(PARAGRAPH_BREAK).collect();

        assert_eq!(
            blocks,
            vec![
                "The Headline",
                "This is the first paragraph of the story, long enough to look like real content.",
                "A second paragraph spans several source lines.",
                "A quoted remark.",
                "One item Nested item",
            ]
        );
    }

    #[test]
    fn test_extract_drops_noise() {
        let text = ArticleExtractor::new().extract(ARTICLE_HTML);
        assert!(!text.contains("tracking"));
        assert!(!text.contains("Site Name"));
        assert!(!text.contains("Home"));
        assert!(!text.contains("Share this"));
        assert!(!text.contains("caption"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_extract_keeps_boilerplate_when_disabled() {
        let config = ExtractConfig { remove_boilerplate: false, ..Default::default() };
        let text = ArticleExtractor::with_config(config).extract(ARTICLE_HTML);
        assert!(text.contains("Share this on social media"));
    }

    #[test]
    fn test_extract_skips_invalid_strip_selector() {
        let config = ExtractConfig { strip_tags: vec!["div[".into(), "script".into()], ..Default::default() };
        let extractor = ArticleExtractor::with_config(config);

        assert_eq!(extractor.extract("<p>Hello there.</p>"), "Hello there.");
        assert_eq!(extractor.extract("<p>Kept.</p><script>dropped()</script>"), "Kept.");
    }

    #[test]
    fn test_extract_inline_markup_keeps_spacing() {
        let html = "<html><body><p>Hello <b>world</b>! A <a href=\"/x\">link</a>, then <em>more</em>.</p></body></html>";
        assert_eq!(ArticleExtractor::new().extract(html), "Hello world! A link, then more.");
    }

    #[test]
    fn test_extract_short_article_falls_back_to_body() {
        let html = r#"<html><body><article><p>Tiny.</p></article><p>Outside the article.</p></body></html>"#;
        let text = ArticleExtractor::new().extract(html);
        assert_eq!(text, "Tiny.\n\nOutside the article.");
    }

    #[test]
    fn test_extract_without_blocks_returns_raw_text() {
        let html = "<html><body><div>Line one.\n\n\n\nLine two.</div></body></html>";
        let text = ArticleExtractor::new().extract(html);
        assert!(text.contains("Line one.\n\n\n\nLine two."));
    }

    #[test]
    fn test_extract_empty_input() {
        let extractor = ArticleExtractor::new();
        assert_eq!(extractor.extract(""), "");
        assert_eq!(extractor.extract("   "), "");
        assert!(extractor.extract("<html><body><script>x()</script></body></html>").trim().is_empty());
    }

    #[test]
    fn test_title_prefers_open_graph() {
        let title = ArticleExtractor::new().extract_metadata_title(ARTICLE_HTML);
        assert_eq!(title, Some("Open Graph Title".to_string()));
    }

    #[test]
    fn test_title_fallbacks() {
        let extractor = ArticleExtractor::new();

        let html = r#"<html><head><meta name="twitter:title" content="Tweet Title"><title>T</title></head></html>"#;
        assert_eq!(extractor.extract_metadata_title(html), Some("Tweet Title".to_string()));

        let html = "<html><head><title>\n  Plain   Title\n</title></head><body><h1>H</h1></body></html>";
        assert_eq!(extractor.extract_metadata_title(html), Some("Plain Title".to_string()));

        let html = "<html><body><h1>Heading Title</h1></body></html>";
        assert_eq!(extractor.extract_metadata_title(html), Some("Heading Title".to_string()));

        let html = r#"<html><head><meta property="og:title" content="  "><title></title></head></html>"#;
        assert_eq!(extractor.extract_metadata_title(html), None);
    }
}
