//! Reader output type and format conversion.
//!
//! [`ExtractionResult`] is what one reader request produces: an optional
//! title, the source URL when known, and the reflowed paragraphs in reading
//! order. An empty paragraph list is a valid outcome, not an error.

use serde::{Deserialize, Serialize};

use crate::render::{render_reader_page, render_text};
use crate::{BroadsheetError, Result};

/// Output format options for a reader result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Standalone reader page.
    Html,
    /// Title plus blank-line separated paragraphs.
    PlainText,
    /// JSON document (structured data).
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = BroadsheetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::PlainText),
            "json" => Ok(Self::Json),
            _ => Err(BroadsheetError::ConfigError(format!(
                "Invalid format: {s}. Valid options: html, text, json"
            ))),
        }
    }
}

/// The complete result of reading one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Title from the page metadata, if any.
    pub title: Option<String>,

    /// Source URL if known.
    pub url: Option<String>,

    /// Reflowed paragraphs in reading order.
    pub paragraphs: Vec<String>,
}

impl ExtractionResult {
    pub fn new(title: Option<String>, url: Option<String>, paragraphs: Vec<String>) -> Self {
        Self { title, url, paragraphs }
    }

    /// Whether extraction produced no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Total characters across all paragraphs.
    pub fn length(&self) -> usize {
        self.paragraphs.iter().map(|p| p.chars().count()).sum()
    }

    /// Word count across all paragraphs.
    pub fn word_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.split_whitespace().count()).sum()
    }

    /// Estimated reading time in minutes (assuming 200 words per minute).
    pub fn reading_time(&self) -> f64 {
        self.word_count() as f64 / 200.0
    }

    /// Converts the result to the given format.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Html => Ok(render_reader_page(self)),
            OutputFormat::PlainText => Ok(render_text(self)),
            OutputFormat::Json => self.to_json().map(|v| v.to_string()),
        }
    }

    /// Gets the result as structured JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
