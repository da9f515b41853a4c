//! Error types for Broadsheet operations.
//!
//! The reflow engine itself never fails; everything around it (fetching,
//! URL validation, configuration, the digest job) reports failures through
//! [`BroadsheetError`].
//!
//! # Example
//!
//! ```rust
//! use broadsheet_core::{BroadsheetError, Result, validate_url};
//!
//! fn check(input: &str) -> Result<()> {
//!     validate_url(input)?;
//!     Ok(())
//! }
//!
//! assert!(matches!(check("ftp://example.com"), Err(BroadsheetError::UnsupportedScheme(_))));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Broadsheet operations.
#[derive(Error, Debug)]
pub enum BroadsheetError {
    /// HTTP request errors from reqwest.
    ///
    /// Network errors, DNS failures, connection resets and body decoding
    /// problems all land here.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The upstream server answered with a non-success status.
    #[error("Upstream returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// A fetch kept being redirected past the hop limit.
    #[error("Too many redirects (more than {limit}) starting from {url}")]
    TooManyRedirects { url: String, limit: usize },

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL scheme other than http or https.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// Host is not on the configured allowlist.
    #[error("Domain is not allowed: {0}")]
    DomainNotAllowed(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A news feed could not be parsed.
    #[error("Feed error: {0}")]
    FeedError(String),

    /// Every feed failed or came back empty.
    #[error("No headlines could be gathered from any feed")]
    NoHeadlines,

    /// The transactional email API rejected the message.
    #[error("Email dispatch failed: {0}")]
    EmailError(String),

    /// JSON (de)serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BroadsheetError {
    /// Whether the error came from talking to the upstream page or API.
    pub fn is_upstream(&self) -> bool {
        match self {
            #[cfg(feature = "fetch")]
            Self::HttpError(_) => true,
            Self::HttpStatus { .. } | Self::TooManyRedirects { .. } | Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for BroadsheetError.
pub type Result<T> = std::result::Result<T, BroadsheetError>;
