//! Presentation of reflowed articles.
//!
//! The reflow engine never escapes its output; every value that reaches an
//! HTML document passes through [`escape_html`] here.

use url::Url;

use crate::ExtractionResult;

/// Shown in place of the article when nothing could be extracted.
pub const EMPTY_ARTICLE_MESSAGE: &str = "We couldn't extract readable text from this page.";

const READER_STYLE: &str = r#"
    body { margin: 0; background: #faf8f3; color: #222; font: 19px/1.6 Georgia, "Times New Roman", serif; }
    main { max-width: 40em; margin: 0 auto; padding: 2.5em 1.25em 4em; }
    h1 { font-size: 1.8em; line-height: 1.25; margin: 0 0 0.4em; }
    .source { font: 14px/1.4 -apple-system, "Segoe UI", sans-serif; color: #777; margin-bottom: 2em; word-break: break-all; }
    .source a { color: inherit; }
    p { margin: 0 0 1.1em; }
    .empty { font-style: italic; color: #777; }
"#;

/// Escapes text for use in HTML element content and quoted attributes.
///
/// # Example
///
/// ```rust
/// use broadsheet_core::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
/// ```
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Title to display: the extracted title, else the source host, else "Untitled".
pub fn display_title(result: &ExtractionResult) -> String {
    result
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| {
            result
                .url
                .as_deref()
                .and_then(|u| Url::parse(u).ok())
                .and_then(|u| u.host_str().map(str::to_string))
        })
        .unwrap_or_else(|| "Untitled".to_string())
}

/// Renders a complete, standalone reader page.
pub fn render_reader_page(result: &ExtractionResult) -> String {
    let title = escape_html(&display_title(result));

    let mut body = String::new();
    body.push_str(&format!("<h1>{title}</h1>\n"));

    if let Some(url) = &result.url {
        let url = escape_html(url);
        body.push_str(&format!("<div class=\"source\">Original: <a href=\"{url}\" rel=\"noopener noreferrer\">{url}</a></div>\n"));
    }

    if result.paragraphs.is_empty() {
        body.push_str(&format!("<p class=\"empty\">{}</p>\n", escape_html(EMPTY_ARTICLE_MESSAGE)));
    } else {
        for paragraph in &result.paragraphs {
            body.push_str("<p>");
            body.push_str(&escape_html(paragraph));
            body.push_str("</p>\n");
        }
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{title}</title>\n<style>{READER_STYLE}</style>\n</head>\n<body>\n<main>\n{body}</main>\n</body>\n</html>\n"
    )
}

/// Renders the article as plain text: title, underline, blank-line separated paragraphs.
pub fn render_text(result: &ExtractionResult) -> String {
    let title = display_title(result);
    let mut output = String::new();

    output.push_str(&title);
    output.push('\n');
    output.push_str(&"=".repeat(title.chars().count()));
    output.push_str("\n\n");

    if let Some(url) = &result.url {
        output.push_str(&format!("Source: {url}\n\n"));
    }

    if result.paragraphs.is_empty() {
        output.push_str(EMPTY_ARTICLE_MESSAGE);
    } else {
        output.push_str(&result.paragraphs.join("\n\n"));
    }

    output.push('\n');
    output
}
