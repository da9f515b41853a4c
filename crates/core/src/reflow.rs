//! Paragraph reflow for extracted article text.
//!
//! Extractors hand back plain text with paragraphs separated by blank lines,
//! but real pages produce mixed line endings, irregular whitespace and the
//! occasional wall of text. [`Reflow`] turns that text into an ordered list of
//! display-ready paragraphs:
//!
//! 1. [`normalize_text`] canonicalizes line endings and blank lines.
//! 2. [`split_paragraphs`] splits on blank lines and collapses whitespace.
//! 3. [`rechunk_paragraph`] regroups oversized paragraphs sentence by sentence.
//!
//! # Example
//!
//! ```rust
//! use broadsheet_core::reflow;
//!
//! let paragraphs = reflow("Hello world.\r\n\r\n\r\n\r\nThis is paragraph two.");
//! assert_eq!(paragraphs, vec!["Hello world.", "This is paragraph two."]);
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Separator between two paragraphs after normalization.
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Default length above which a paragraph is regrouped by sentence.
pub const DEFAULT_OVERSIZE_THRESHOLD: usize = 700;

/// Default target length for regrouped paragraphs.
pub const DEFAULT_SOFT_CAP: usize = 480;

const OPENING_QUOTES: [char; 6] = ['"', '\'', '“', '‘', '«', '„'];

static HORIZONTAL_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("horizontal whitespace pattern"));

static WHITESPACE_ONLY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]+$").expect("whitespace-only line pattern"));

static EXCESS_LINE_FEEDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("line feed run pattern"));

/// Configuration for paragraph reflow.
///
/// # Example
///
/// ```rust
/// use broadsheet_core::ReflowConfig;
///
/// let config = ReflowConfig::builder().soft_cap(320).oversize_threshold(500).build();
/// assert_eq!(config.soft_cap, 320);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflowConfig {
    /// Paragraphs longer than this many characters are regrouped (default: 700).
    pub oversize_threshold: usize,

    /// Target maximum length of a regrouped paragraph (default: 480).
    pub soft_cap: usize,
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self { oversize_threshold: DEFAULT_OVERSIZE_THRESHOLD, soft_cap: DEFAULT_SOFT_CAP }
    }
}

impl ReflowConfig {
    /// Creates a new builder for ReflowConfig.
    pub fn builder() -> ReflowConfigBuilder {
        ReflowConfigBuilder::new()
    }
}

/// Builder for [`ReflowConfig`].
pub struct ReflowConfigBuilder {
    config: ReflowConfig,
}

impl ReflowConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ReflowConfig::default() }
    }

    /// Sets the length above which paragraphs are regrouped.
    pub fn oversize_threshold(mut self, value: usize) -> Self {
        self.config.oversize_threshold = value;
        self
    }

    /// Sets the target length of regrouped paragraphs.
    pub fn soft_cap(mut self, value: usize) -> Self {
        self.config.soft_cap = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ReflowConfig {
        self.config
    }
}

impl Default for ReflowConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Paragraph reflow engine.
///
/// Holds only its configuration, so one instance can be shared freely
/// between requests.
///
/// # Example
///
/// ```rust
/// use broadsheet_core::{Reflow, ReflowConfig};
///
/// let reflow = Reflow::with_config(ReflowConfig::builder().soft_cap(200).build());
/// assert!(reflow.reflow("").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Reflow {
    config: ReflowConfig,
}

impl Reflow {
    /// Creates an engine with the default thresholds.
    pub fn new() -> Self {
        Self { config: ReflowConfig::default() }
    }

    /// Creates an engine with custom thresholds.
    pub fn with_config(config: ReflowConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ReflowConfig {
        &self.config
    }

    /// Reflows raw extracted text into display-ready paragraphs.
    ///
    /// Never fails: empty or whitespace-only input yields an empty list.
    pub fn reflow(&self, raw: &str) -> Vec<String> {
        let normalized = normalize_text(raw);
        if normalized.is_empty() {
            return Vec::new();
        }

        split_paragraphs(&normalized)
            .iter()
            .flat_map(|candidate| rechunk_paragraph(candidate, &self.config))
            .collect()
    }

    /// Same as [`Reflow::reflow`], treating absent text as empty.
    pub fn reflow_optional(&self, raw: Option<&str>) -> Vec<String> {
        self.reflow(raw.unwrap_or_default())
    }
}

/// Canonicalizes line endings and blank lines.
///
/// `CRLF` and bare `CR` become `LF`, whitespace-only lines count as blank,
/// any run of blank lines shrinks to a single blank line, and the whole text
/// is trimmed.
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = WHITESPACE_ONLY_LINE.replace_all(&text, "");
    let text = EXCESS_LINE_FEEDS.replace_all(&text, PARAGRAPH_BREAK);

    text.trim().to_string()
}

/// Splits normalized text into candidate paragraphs.
///
/// Segments are separated by [`PARAGRAPH_BREAK`]; blank segments are dropped
/// and horizontal whitespace runs inside the rest collapse to one space.
/// "Horizontal" means any Unicode whitespace other than `\n`, so tabs,
/// non-breaking spaces, vertical tabs and form feeds collapse along with
/// plain spaces.
pub fn split_paragraphs(normalized: &str) -> Vec<String> {
    normalized
        .split(PARAGRAPH_BREAK)
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| HORIZONTAL_WHITESPACE.replace_all(segment, " ").trim().to_string())
        .collect()
}

/// Splits text into sentence-like units.
///
/// A boundary sits after `.`, `!` or `?` followed by whitespace, when the next
/// non-whitespace character is an uppercase letter, a digit or an opening
/// quotation mark. Abbreviations such as "Mr. Smith" are split too.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }

        let end = idx + ch.len_utf8();
        let mut saw_whitespace = false;
        while let Some(&(_, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            saw_whitespace = true;
            chars.next();
        }

        if !saw_whitespace {
            continue;
        }

        if let Some(&(next_idx, next)) = chars.peek()
            && opens_sentence(next)
        {
            let unit = text[start..end].trim();
            if !unit.is_empty() {
                units.push(unit);
            }
            start = next_idx;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        units.push(tail);
    }

    units
}

fn opens_sentence(ch: char) -> bool {
    ch.is_uppercase() || ch.is_ascii_digit() || OPENING_QUOTES.contains(&ch)
}

/// Regroups one candidate paragraph so no chunk grows past the soft cap.
///
/// Candidates at or below `oversize_threshold` come back untouched. Longer
/// ones are split into sentences and greedily packed; a single sentence that
/// alone exceeds the soft cap is kept whole.
pub fn rechunk_paragraph(candidate: &str, config: &ReflowConfig) -> Vec<String> {
    if candidate.chars().count() <= config.oversize_threshold {
        return vec![candidate.to_string()];
    }

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0;

    for unit in split_sentences(candidate) {
        let unit_len = unit.chars().count();

        if buffer_len == 0 {
            buffer.push_str(unit);
            buffer_len = unit_len;
        } else if buffer_len + unit_len + 1 > config.soft_cap {
            chunks.push(std::mem::take(&mut buffer));
            buffer.push_str(unit);
            buffer_len = unit_len;
        } else {
            buffer.push(' ');
            buffer.push_str(unit);
            buffer_len += unit_len + 1;
        }
    }

    if !buffer.is_empty() {
        chunks.push(buffer);
    }

    chunks
}

/// Reflows text with the default thresholds.
///
/// # Example
///
/// ```rust
/// use broadsheet_core::reflow;
///
/// assert!(reflow("").is_empty());
/// assert_eq!(reflow("One.\n\nTwo."), vec!["One.", "Two."]);
/// ```
pub fn reflow(raw: &str) -> Vec<String> {
    Reflow::new().reflow(raw)
}

/// Reflows optional text with the default thresholds.
pub fn reflow_optional(raw: Option<&str>) -> Vec<String> {
    Reflow::new().reflow_optional(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Builds an ASCII sentence of exactly `len` characters ending in a period.
    fn sentence(n: usize, len: usize) -> String {
        let mut s = format!("Sentence {n} reports");
        while s.len() < len {
            s.push_str(" lorem ipsum");
        }
        s.truncate(len - 1);
        s.push('.');
        s
    }

    fn lowercase_run(len: usize) -> String {
        let mut s = String::from("it begins quietly, e.g. with lowercase words");
        while s.len() < len {
            s.push_str(" and more. then more");
        }
        s.truncate(len);
        s.truncate(s.trim_end().len());
        while s.len() < len {
            s.push('x');
        }
        s
    }

    #[test]
    fn test_reflow_config_default() {
        let config = ReflowConfig::default();
        assert_eq!(config.oversize_threshold, 700);
        assert_eq!(config.soft_cap, 480);
    }

    #[test]
    fn test_reflow_config_builder() {
        let config = ReflowConfig::builder().oversize_threshold(300).soft_cap(120).build();
        assert_eq!(config.oversize_threshold, 300);
        assert_eq!(config.soft_cap, 120);
        assert_eq!(*Reflow::with_config(config).config(), config);
    }

    #[rstest]
    #[case("", "")]
    #[case("   \n\t  ", "")]
    #[case("a\r\nb", "a\nb")]
    #[case("a\rb", "a\nb")]
    #[case("a\r\n\r\nb", "a\n\nb")]
    #[case("a\n\n\n\n\nb", "a\n\nb")]
    #[case("a\n  \n\t\n \nb", "a\n\nb")]
    #[case("\n\n  a\n\nb  \n\n", "a\n\nb")]
    fn test_normalize_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_text(input), expected);
    }

    #[test]
    fn test_split_paragraphs_collapses_horizontal_whitespace() {
        let paragraphs = split_paragraphs("Hello \t\u{b}\u{c}  world.\n\n  Second\u{a0}\u{a0}one  ");
        assert_eq!(paragraphs, vec!["Hello world.", "Second one"]);
    }

    #[test]
    fn test_split_paragraphs_single_block() {
        let paragraphs = split_paragraphs("one line\nanother line");
        assert_eq!(paragraphs, vec!["one line\nanother line"]);
    }

    #[rstest]
    #[case("One. Two. Three.", vec!["One.", "Two.", "Three."])]
    #[case("Is it? Yes! 42 followed.", vec!["Is it?", "Yes!", "42 followed."])]
    #[case("He said. \"Quote here.\" Done.", vec!["He said.", "\"Quote here.\" Done."])]
    #[case("e.g. lowercase. no split here", vec!["e.g. lowercase. no split here"])]
    #[case("No terminal punctuation", vec!["No terminal punctuation"])]
    #[case("Ends with a dot.", vec!["Ends with a dot."])]
    #[case("Dot.Without space. Next", vec!["Dot.Without space.", "Next"])]
    #[case("Line one.\nLine two.", vec!["Line one.", "Line two."])]
    #[case("Élan. Über alles.", vec!["Élan.", "Über alles."])]
    fn test_split_sentences(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_sentences(input), expected);
    }

    #[test]
    fn test_split_sentences_keeps_abbreviation_heuristic() {
        assert_eq!(split_sentences("Mr. Smith arrived."), vec!["Mr.", "Smith arrived."]);
    }

    #[test]
    fn test_rechunk_short_paragraph_untouched() {
        let text = sentence(0, 700);
        assert_eq!(rechunk_paragraph(&text, &ReflowConfig::default()), vec![text]);
    }

    #[test]
    fn test_rechunk_threshold_boundary() {
        let config = ReflowConfig::default();

        let at_threshold = format!("{} {}", sentence(0, 350), sentence(1, 349));
        assert_eq!(at_threshold.chars().count(), 700);
        assert_eq!(rechunk_paragraph(&at_threshold, &config), vec![at_threshold.clone()]);

        let over_threshold = format!("{} {}", sentence(0, 350), sentence(1, 350));
        assert_eq!(over_threshold.chars().count(), 701);
        assert_eq!(rechunk_paragraph(&over_threshold, &config), vec![sentence(0, 350), sentence(1, 350)]);
    }

    #[test]
    fn test_rechunk_packs_sentences_greedily() {
        let sentences: Vec<String> = (0..8).map(|n| sentence(n, 150)).collect();
        let text = sentences.join(" ");
        let chunks = rechunk_paragraph(&text, &ReflowConfig::default());

        // 150 + 1 + 150 + 1 + 150 = 452 fits, a fourth sentence would not.
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], sentences[..3].join(" "));
        assert_eq!(chunks[1], sentences[3..6].join(" "));
        assert_eq!(chunks[2], sentences[6..].join(" "));
    }

    #[test]
    fn test_rechunk_boundary_is_inclusive() {
        // 239 + 1 + 240 = 480 exactly: still fits.
        let text = [sentence(0, 239), sentence(1, 240), sentence(2, 300)].join(" ");
        let chunks = rechunk_paragraph(&text, &ReflowConfig::default());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 480);
    }

    #[test]
    fn test_rechunk_oversized_sentence_stands_alone() {
        let long = sentence(1, 600);
        let text = [sentence(0, 100), long.clone(), sentence(2, 100)].join(" ");
        let chunks = rechunk_paragraph(&text, &ReflowConfig::default());
        assert_eq!(chunks, vec![sentence(0, 100), long, sentence(2, 100)]);
    }

    #[test]
    fn test_rechunk_counts_characters_not_bytes() {
        // 605 characters but 1205 bytes: below the threshold.
        let word = "É".repeat(200);
        let text = format!("{word}. {word}. {word}.");
        let chunks = rechunk_paragraph(&text, &ReflowConfig::default());
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_two_short_paragraphs_pass_through() {
        assert_eq!(
            reflow("Hello world.\n\nThis is paragraph two."),
            vec!["Hello world.", "This is paragraph two."]
        );
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(reflow("").is_empty());
        assert!(reflow_optional(None).is_empty());
        assert!(reflow(" \r\n\t\r\n ").is_empty());
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        let single = reflow("First paragraph.\n\nSecond paragraph.");
        let many = reflow("First paragraph.\n\n\n\n\n\nSecond paragraph.");
        assert_eq!(single, many);
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_wall_of_text_is_regrouped() {
        let sentences: Vec<String> = (0..6).map(|n| sentence(n, 330)).collect();
        let text = sentences.join(" ");
        assert!(text.len() > 1900);

        let paragraphs = reflow(&text);
        assert_eq!(paragraphs, sentences);
        for paragraph in &paragraphs {
            assert!(!paragraph.is_empty());
            assert!(paragraph.chars().count() <= 480);
            assert!(paragraph.ends_with('.'));
        }
    }

    #[test]
    fn test_unsplittable_sentence_kept_whole() {
        let text = lowercase_run(900);
        let paragraphs = reflow(&text);
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].chars().count(), 900);
    }

    #[test]
    fn test_custom_config_changes_grouping() {
        let text = [sentence(0, 100), sentence(1, 100), sentence(2, 100)].join(" ");
        let reflow = Reflow::with_config(ReflowConfig::builder().oversize_threshold(200).soft_cap(150).build());
        assert_eq!(reflow.reflow(&text).len(), 3);
        assert_eq!(Reflow::new().reflow(&text).len(), 1);
    }

    fn corpus() -> Vec<String> {
        let wall: Vec<String> = (0..9).map(|n| sentence(n, 90 + n * 37)).collect();
        vec![
            String::new(),
            "Hello world.\n\nThis is paragraph two.".to_string(),
            format!("Intro line.\r\n\r\n\r\n{}\r\n\r\nOutro!", wall.join(" ")),
            format!("{}\n\n\n\n{}", lowercase_run(1200), wall.join("  \t ")),
            format!("  lead\t\twhitespace  \n \n \n{}\n{}", sentence(1, 500), sentence(2, 500)),
            wall.join("\n"),
        ]
    }

    #[test]
    fn test_property_paragraph_shape() {
        for text in corpus() {
            for paragraph in reflow(&text) {
                assert!(!paragraph.is_empty());
                assert_eq!(paragraph, paragraph.trim());
                assert!(!paragraph.contains(PARAGRAPH_BREAK));
                assert!(!paragraph.contains("  "));
                assert!(!paragraph.contains('\t'));
                assert!(!paragraph.contains('\r'));
            }
        }
    }

    #[test]
    fn test_property_length_bound() {
        let config = ReflowConfig::default();
        for text in corpus() {
            for paragraph in reflow(&text) {
                let within_cap = paragraph.chars().count() <= config.soft_cap;
                let indivisible = split_sentences(&paragraph).len() == 1;
                let untouched = paragraph.chars().count() <= config.oversize_threshold;
                assert!(within_cap || indivisible || untouched, "paragraph too long: {paragraph}");
            }
        }
    }

    #[test]
    fn test_property_order_and_content_preserved() {
        for text in corpus() {
            let paragraphs = reflow(&text);
            let joined = paragraphs.join(" ");
            let original: Vec<&str> = text.split_whitespace().collect();
            let reflowed: Vec<&str> = joined.split_whitespace().collect();
            assert_eq!(original, reflowed);
        }
    }

    #[test]
    fn test_property_blank_line_collapse_is_invisible() {
        for text in corpus() {
            let collapsed = EXCESS_LINE_FEEDS.replace_all(&text.replace("\r\n", "\n"), "\n\n").to_string();
            assert_eq!(reflow(&text), reflow(&collapsed));
        }
    }

    #[test]
    fn test_property_deterministic() {
        for text in corpus() {
            assert_eq!(reflow(&text), reflow(&text));
        }
    }

    #[test]
    fn test_property_sentences_survive_regrouping() {
        for text in corpus() {
            let expected: Vec<String> = split_paragraphs(&normalize_text(&text))
                .iter()
                .flat_map(|candidate| split_sentences(candidate).into_iter().map(str::to_string).collect::<Vec<_>>())
                .collect();
            let actual: Vec<String> = reflow(&text)
                .iter()
                .flat_map(|paragraph| split_sentences(paragraph).into_iter().map(str::to_string).collect::<Vec<_>>())
                .collect();
            assert_eq!(expected, actual);
        }
    }
}
